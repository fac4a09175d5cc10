use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    Eval(E),
}

pub trait Repl {
    type Error: std::fmt::Debug;
    const PROMPT: &'static str = ">> ";
    const HISTORY: Option<&'static str> = None;
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error>;
}

/// Line loop around a [`Repl`]. A trailing backslash continues the input on
/// the next prompt; Ctrl-C and Ctrl-D leave.
pub fn start<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = R::HISTORY {
        editor.load_history(history).ok();
    }
    let mut pending: Option<String> = None;
    let result = loop {
        match editor.readline(R::PROMPT) {
            Ok(mut line) if line.ends_with('\\') => {
                line.pop();
                line.push('\n');
                match pending.as_mut() {
                    Some(pending) => pending.push_str(&line),
                    None => pending = Some(line),
                }
            }
            Ok(line) => {
                let input = match pending.take() {
                    Some(mut input) => {
                        input.push_str(&line);
                        input
                    }
                    None => line,
                };
                if input.is_empty() {
                    continue;
                }
                editor.add_history_entry(input.as_str());
                if let Err(e) = repl.evaluate(input) {
                    break Err(Error::Eval(e));
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    };
    if let Some(history) = R::HISTORY {
        editor.save_history(history).ok();
    }
    result
}
