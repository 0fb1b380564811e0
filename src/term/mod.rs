/*!
## Terminal front end

Line editing with history on top of a [`Shell`]. CTRL-C asks the running
program to stop; CTRL-D leaves.

*/

use crate::mach::Listing;
use crate::shell::{classify, Config, Input, Shell, Sinks};
use ansi_term::Style;
use linefeed::{Completer, Completion, Interface, Prompter, ReadResult, Terminal};
use std::sync::Arc;
use tracing::{debug, warn};

pub fn main(config: Config) {
    if let Err(error) = main_loop(config) {
        eprintln!("{}", error);
    }
}

fn main_loop(config: Config) -> std::io::Result<()> {
    let interface = Arc::new(Interface::new("cartbasic")?);
    let out = interface.clone();
    let err = interface.clone();
    let sinks = Sinks {
        output: Arc::new(move |s: &str| {
            let _ = out.write_fmt(format_args!("{}", s));
        }),
        error: Arc::new(move |s: &str| {
            let _ = err.write_fmt(format_args!("{}\n", Style::new().bold().paint(s)));
        }),
        status: Arc::new(|running: bool| debug!(running, "status")),
    };
    let shell = Shell::new(config).with_sinks(sinks);

    let stop = shell.stop_handle();
    if let Err(error) = ctrlc::set_handler(move || stop.request()) {
        warn!(%error, "CTRL-C will not stop programs");
    }

    interface.write_fmt(format_args!("cartbasic\nREADY.\n"))?;
    loop {
        let prompt = match shell.auto_prompt() {
            Some(number) => format!("{} ", number),
            None => String::new(),
        };
        interface.set_prompt(&prompt)?;
        interface.set_completer(Arc::new(LineCompleter::new(shell.listing())));
        let string = match interface.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        let is_command = matches!(classify(&string), Input::Command { .. });
        let reply = shell.execute_line(&string);
        if !string.trim().is_empty() {
            interface.add_history_unique(string);
        }
        if !reply.output.is_empty() {
            interface.write_fmt(format_args!("{}\n", reply.output))?;
        }
        if let Some(error) = reply.error {
            interface.write_fmt(format_args!(
                "{}\n",
                Style::new().bold().paint(error.to_string())
            ))?;
        }
        if is_command && shell.auto_prompt().is_none() {
            interface.write_fmt(format_args!("READY.\n"))?;
        }
    }
    Ok(())
}

/// TAB after a line number brings the stored line back for editing.
struct LineCompleter {
    listing: Listing,
}

impl LineCompleter {
    fn new(listing: Listing) -> LineCompleter {
        LineCompleter { listing }
    }
}

impl<Term: Terminal> Completer<Term> for LineCompleter {
    fn complete(
        &self,
        _word: &str,
        prompter: &Prompter<Term>,
        _start: usize,
        _end: usize,
    ) -> Option<Vec<Completion>> {
        let number = prompter.buffer().trim().parse().ok()?;
        let line = self.listing.get(number)?;
        let mut completion = Completion::simple(line.to_string());
        completion.suffix = linefeed::complete::Suffix::None;
        Some(vec![completion])
    }
}
