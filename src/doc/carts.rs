/*!
# Carts

A cart is a directory holding a program and the files it uses.

```text
game/
  cart.json      name, timestamps, assets with CRC-32
  main.bas       the program
  script/
  image/
  sound/
  data/
```

## `CREATECART path`
Make a new empty cart. Fails if `path` already exists.

## `USECART path`
Open a cart and load its `main.bas` into memory.

## `SAVECART`
Write the program to `main.bas` and recompute every asset checksum.

## `COPY SCRIPT|IMAGE|SOUND|DATA source name`
Copy `source` from the scripts directory into the cart as `name`.

## `CLOSECART`
Close the cart. The program stays in memory.

Every command but `CREATECART` and `USECART` needs an open cart.

*/
