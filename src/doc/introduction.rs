/*!
# Introductory Tutorial for cartbasic

Start the executable from a terminal. Type CTRL-D to leave. A running
program is stopped with CTRL-C.

<pre><code>&nbsp;  cartbasic
&nbsp;  READY.
&nbsp;> █
</code></pre>

Everything you type is either a program line or a command. A line that
starts with a number is stored in the program under that number. Anything
else is a command.

<pre><code>&nbsp;> 10 print "Hello World"
&nbsp;> 20 goto 10
&nbsp;> LIST
&nbsp;  10 print "Hello World"
&nbsp;  20 goto 10
</code></pre>

Programs are not interpreted line by line. `RUN` compiles the whole
program first. Any mistake is reported with the stage that found it and
the line it is on, and nothing runs.

<pre><code>&nbsp;> 30 goto 99
&nbsp;> RUN
&nbsp;  semantic error: UNDEFINED LINE IN 30 (5..7)
</code></pre>

Typing a line number with nothing after it deletes that line. To change a
line, type it again.

<pre><code>&nbsp;> 30
&nbsp;> RUN
&nbsp;  Hello World
&nbsp;  Hello World
&nbsp;  ...
</code></pre>

Press CTRL-C to stop it. The program is still in memory. Save it with
`SAVE "hello"` which writes `hello.bas` in the scripts directory, and get it
back later with `LOAD "hello"`.

`AUTO` saves typing line numbers. Each line you enter is given the next
number until you enter a blank line or any command.

<pre><code>&nbsp;> AUTO 100 5
&nbsp;  100 for i = 1 to 3
&nbsp;  105 print i
&nbsp;  110 next
&nbsp;  115
&nbsp;> RUN
&nbsp;   1
&nbsp;   2
&nbsp;   3
</code></pre>

The dialect is small on purpose: `PRINT`, `LET`, `GOTO`, `GOSUB`,
`RETURN`, `IF THEN ELSE`, `FOR NEXT`, `REM` and `END`, with number and
string (`$`) variables. Native functions such as `ABS`, `INT`, `SQR`,
`SIN`, `COS`, `RND`, `LEN`, `STR$` and `CHR$` are supplied by the shell and
checked at compile time.

*/
