use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use stepper::{
    lang::Lang,
    parser,
    path::Path,
    printer,
    reduce::normal_order_redex,
    session::{Mode, Session, TermInfo},
    worker::NormalizationWorker,
};
use util::repl;

const AUTO_BUDGET: Duration = Duration::from_secs(5);

struct Stepper {
    lang: Lang,
    session: Option<Session>,
}

impl Stepper {
    fn new() -> Self {
        Stepper {
            lang: Lang::Tex,
            session: None,
        }
    }

    fn session(&mut self) -> Result<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| anyhow!("no term loaded, enter one first"))
    }

    fn load(&mut self, input: &str) -> Result<()> {
        let term = parser::parse(input)?;
        let session = Session::new(term);
        show_info(session.current(), self.lang);
        self.session = Some(session);
        Ok(())
    }

    fn print_all_notations(&mut self) -> Result<()> {
        let session = self.session()?;
        let term = session.current().term.clone();
        for lang in Lang::ALL {
            let name = lang.to_string();
            println!("{name:>10}  {}", printer::print(&term, lang.info()));
        }
        Ok(())
    }

    fn show_redex(&mut self) -> Result<()> {
        let session = self.session()?;
        match normal_order_redex(&session.current().term) {
            Some(target) => println!("next redex at `{target}`"),
            None => println!("already in normal form"),
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let lang = self.lang;
        let session = self.session()?;
        if session.step()? {
            show_info(session.current(), lang);
        } else {
            println!("already in normal form");
        }
        Ok(())
    }

    fn reduce(&mut self, input: &str) -> Result<()> {
        let lang = self.lang;
        let target: Path = input.parse()?;
        let session = self.session()?;
        session.reduce_at(&target)?;
        show_info(session.current(), lang);
        Ok(())
    }

    fn auto(&mut self) -> Result<()> {
        let lang = self.lang;
        let session = self.session()?;
        let before = session.history().len();
        session.start_auto(AUTO_BUDGET);
        let deadline = Instant::now() + AUTO_BUDGET;
        while session.mode() == Mode::AutoRunning {
            if Instant::now() >= deadline {
                session.cancel();
                println!("gave up after {AUTO_BUDGET:?}, this term may have no normal form");
                return Ok(());
            }
            session.tick();
        }
        let steps = &session.history()[before..];
        for info in steps {
            show_info(info, lang);
        }
        println!("normal form reached in {} steps", steps.len());
        Ok(())
    }

    fn normal(&mut self) -> Result<()> {
        let lang = self.lang;
        let session = self.session()?;
        let term = session.current().term.clone();
        let worker = NormalizationWorker::spawn(term.clone(), 0, AUTO_BUDGET);
        match worker.wait(AUTO_BUDGET) {
            Some(steps) => {
                let normal = steps.last().map(|step| step.term.clone()).unwrap_or(term);
                println!("{}", printer::print(&normal, lang.info()));
            }
            None => println!("gave up after {AUTO_BUDGET:?}, this term may have no normal form"),
        }
        Ok(())
    }

    fn history(&mut self) -> Result<()> {
        let lang = self.lang;
        let session = self.session()?;
        for (i, info) in session.history().iter().enumerate() {
            match &info.target {
                Some(target) => println!(
                    "{i:>4}  {}    [reduced at `{target}`]",
                    printer::print(&info.term, lang.info())
                ),
                None => println!("{i:>4}  {}", printer::print(&info.term, lang.info())),
            }
        }
        Ok(())
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term                -- load a term, e.g. (x y. x), lambda x: x, x => x
:parse    term      -- show the parsed tree
:print              -- show the current term in every notation
:lang     name      -- switch notation (python, js, tex)
:redex              -- address of the next normal-order redex
:step               -- one normal-order reduction
:reduce   address   -- reduce at an address over {d, l, r}
:auto               -- reduce to normal form (with a background worker)
:normal             -- just the normal form, no intermediate steps
:history            -- all steps taken so far
:reset              -- back to the starting term
:help               -- show this message
        "#
            .trim()
        );
    }

    fn handle(&mut self, input: &str) -> Result<()> {
        let (cmd, rest) = if let Some(stripped) = input.strip_prefix(':') {
            stripped
                .trim_start()
                .split_once(' ')
                .unwrap_or((stripped, ""))
        } else {
            ("", input)
        };
        let rest = rest.trim();
        match cmd {
            "" => self.load(rest)?,
            "p" | "parse" => {
                let term = parser::parse(rest)?;
                println!("{term:?}");
            }
            "print" => self.print_all_notations()?,
            "l" | "lang" => {
                self.lang = rest.parse()?;
                println!("printing as {}", self.lang);
            }
            "redex" => self.show_redex()?,
            "s" | "step" => self.step()?,
            "r" | "reduce" => self.reduce(rest)?,
            "a" | "auto" => self.auto()?,
            "n" | "normal" => self.normal()?,
            "history" => self.history()?,
            "reset" => {
                self.session()?.reset();
            }
            "h" | "he" | "hel" | "help" => Self::show_help(),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }
}

fn show_info(info: &TermInfo, lang: Lang) {
    let rendered = printer::print(&info.term, lang.info());
    match &info.target {
        Some(target) => println!("{rendered}    [reduced at `{target}`]"),
        None => println!("{rendered}"),
    }
}

impl repl::Repl for Stepper {
    type Error = anyhow::Error;
    const PROMPT: &'static str = "λ> ";
    const HISTORY: Option<&'static str> = Some("/tmp/stepper.history");

    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.handle(input) {
            eprintln!("Error: {e}");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    println!("Untyped lambda-calculus stepper. :h to show help");
    println!();
    repl::start(Stepper::new())?;
    Ok(())
}
