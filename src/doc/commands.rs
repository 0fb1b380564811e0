/*!
# Shell Commands

Command names are not case sensitive. Arguments are separated by spaces;
put an argument in double quotes when it contains spaces.

## `LIST [from [to]]`
Show the program, or the lines from `from` on, or `from` through `to`.

## `NEW`
Erase the program.

## `RUN`
Compile and run the program. A running program can be stopped with
CTRL-C or `STOP`. Running again stops the previous run first; two
programs never run at once.

## `STOP`
Ask a background run to stop. The program stops the next time it checks,
which is at least every 256 instructions and on every loop.

## `SAVE [file]` and `LOAD file`
Write or read the program as text, one `number content` line each. A
name without an extension gets `.bas`. Relative names are found in the
scripts directory. `SAVE` with no name reuses the last file. A file with
a line that has no number is rejected and the program is left alone.

## `AUTO [start [increment]]`
Number lines for you, from 10 by 10 unless told otherwise. A blank line
or any command ends it.

## `DELETE from [to]`
Remove one line or a range. Missing lines are ignored.

## `RENUM [start [increment [from]]]`
Renumber lines starting at `from`, rewriting every `GOTO`, `GOSUB`,
`THEN` and `ELSE` that refers to them. Lines that would change order are
refused.

## `DIR`
List the scripts directory with sizes and modification times.

## `VERBOSE [ON|OFF]`
When on, `RUN` prints the compiled script before it runs.

## `OPTIMIZE [AST|PEEPHOLE [ON|OFF]]`
Show or switch the optional optimizer passes. Constant folding is the AST
pass. The peephole pass removes remarks, self assignments and dead
statements.

## Configuration
Settings come from a JSON file named by `CARTBASIC_CONFIG`:

```text
{ "scripts_directory": "progs", "auto_increment": 5, "background_run": true }
```

`CARTBASIC_SCRIPTS`, `CARTBASIC_VERBOSE` and `CARTBASIC_BACKGROUND`
override the file. Logging follows `RUST_LOG`.

*/
