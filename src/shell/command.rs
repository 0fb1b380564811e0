use crate::error;
use crate::lang::{Error, LineNumber};
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Error>;

/// Kinds of file a cart keeps, one subdirectory each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Image,
    Sound,
    Data,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Script,
        AssetKind::Image,
        AssetKind::Sound,
        AssetKind::Data,
    ];

    pub fn dir(self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::Image => "image",
            AssetKind::Sound => "sound",
            AssetKind::Data => "data",
        }
    }

    pub fn from_name(name: &str) -> Option<AssetKind> {
        match name.to_ascii_uppercase().as_str() {
            "SCRIPT" => Some(AssetKind::Script),
            "IMAGE" => Some(AssetKind::Image),
            "SOUND" => Some(AssetKind::Sound),
            "DATA" => Some(AssetKind::Data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Ast,
    Peephole,
}

/// Every command the shell understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Option<LineNumber>, Option<LineNumber>),
    New,
    Run,
    Stop,
    Save(Option<String>),
    Load(String),
    Auto(Option<LineNumber>, Option<LineNumber>),
    Delete(LineNumber, LineNumber),
    Renum(Option<LineNumber>, Option<LineNumber>, Option<LineNumber>),
    Dir,
    CreateCart(String),
    UseCart(String),
    SaveCart,
    CloseCart,
    Copy {
        kind: AssetKind,
        src: String,
        dest: String,
    },
    Verbose(Option<bool>),
    Optimize(Option<(Pass, Option<bool>)>),
    Unknown(String),
}

impl Command {
    pub const NAMES: [&'static str; 17] = [
        "LIST", "NEW", "RUN", "STOP", "SAVE", "LOAD", "AUTO", "DELETE", "RENUM", "DIR",
        "CREATECART", "USECART", "SAVECART", "CLOSECART", "COPY", "VERBOSE", "OPTIMIZE",
    ];

    /// True when `name` is a command this shell would dispatch.
    pub fn is_known(name: &str) -> bool {
        Command::NAMES.contains(&name.to_ascii_uppercase().as_str())
    }

    /// Map a classified name and argument list onto a command. `name`
    /// must already be upper case.
    pub fn parse(name: &str, args: &[String]) -> Result<Command> {
        let command = match name {
            "LIST" => {
                max_args(args, 2)?;
                Command::List(number(args, 0)?, number(args, 1)?)
            }
            "NEW" => no_args(args, Command::New)?,
            "RUN" => no_args(args, Command::Run)?,
            "STOP" => no_args(args, Command::Stop)?,
            "SAVE" => {
                max_args(args, 1)?;
                Command::Save(args.get(0).cloned())
            }
            "LOAD" => {
                max_args(args, 1)?;
                Command::Load(required(args, 0, "FILE NAME")?)
            }
            "AUTO" => {
                max_args(args, 2)?;
                Command::Auto(number(args, 0)?, number(args, 1)?)
            }
            "DELETE" => {
                max_args(args, 2)?;
                let from = number(args, 0)?.ok_or_else(|| error!(SyntaxError; "LINE NUMBER"))?;
                let to = number(args, 1)?.unwrap_or(from);
                Command::Delete(from, to)
            }
            "RENUM" => {
                max_args(args, 3)?;
                Command::Renum(number(args, 0)?, number(args, 1)?, number(args, 2)?)
            }
            "DIR" => no_args(args, Command::Dir)?,
            "CREATECART" => {
                max_args(args, 1)?;
                Command::CreateCart(required(args, 0, "CART PATH")?)
            }
            "USECART" => {
                max_args(args, 1)?;
                Command::UseCart(required(args, 0, "CART PATH")?)
            }
            "SAVECART" => no_args(args, Command::SaveCart)?,
            "CLOSECART" => no_args(args, Command::CloseCart)?,
            "COPY" => {
                max_args(args, 3)?;
                let kind = required(args, 0, "ASSET KIND")?;
                let kind = AssetKind::from_name(&kind)
                    .ok_or_else(|| error!(SyntaxError; "EXPECTED SCRIPT, IMAGE, SOUND OR DATA"))?;
                Command::Copy {
                    kind,
                    src: required(args, 1, "SOURCE")?,
                    dest: required(args, 2, "DESTINATION")?,
                }
            }
            "VERBOSE" => {
                max_args(args, 1)?;
                Command::Verbose(switch(args, 0)?)
            }
            "OPTIMIZE" => {
                max_args(args, 2)?;
                match args.get(0) {
                    None => Command::Optimize(None),
                    Some(pass) => {
                        let pass = match pass.to_ascii_uppercase().as_str() {
                            "AST" => Pass::Ast,
                            "PEEPHOLE" => Pass::Peephole,
                            _ => return Err(error!(SyntaxError; "EXPECTED AST OR PEEPHOLE")),
                        };
                        Command::Optimize(Some((pass, switch(args, 1)?)))
                    }
                }
            }
            _ => Command::Unknown(name.to_string()),
        };
        Ok(command)
    }
}

fn no_args(args: &[String], command: Command) -> Result<Command> {
    max_args(args, 0)?;
    Ok(command)
}

fn max_args(args: &[String], max: usize) -> Result<()> {
    if args.len() > max {
        return Err(error!(SyntaxError; "TOO MANY ARGUMENTS"));
    }
    Ok(())
}

fn required(args: &[String], index: usize, what: &str) -> Result<String> {
    match args.get(index) {
        Some(arg) if !arg.is_empty() => Ok(arg.clone()),
        _ => Err(error!(SyntaxError; &format!("MISSING {}", what))),
    }
}

fn number(args: &[String], index: usize) -> Result<Option<LineNumber>> {
    match args.get(index) {
        None => Ok(None),
        Some(arg) => match arg.parse::<LineNumber>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(error!(SyntaxError; &format!("NOT A LINE NUMBER: {}", arg))),
        },
    }
}

fn switch(args: &[String], index: usize) -> Result<Option<bool>> {
    match args.get(index).map(|s| s.to_ascii_uppercase()) {
        None => Ok(None),
        Some(s) if s == "ON" => Ok(Some(true)),
        Some(s) if s == "OFF" => Ok(Some(false)),
        Some(_) => Err(error!(SyntaxError; "EXPECTED ON OR OFF")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    fn parse(name: &str, args: &[&str]) -> Result<Command> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Command::parse(name, &args)
    }

    #[test]
    fn test_list_and_delete() {
        assert_eq!(parse("LIST", &[]).unwrap(), Command::List(None, None));
        assert_eq!(
            parse("LIST", &["10", "20"]).unwrap(),
            Command::List(Some(10), Some(20))
        );
        assert_eq!(parse("DELETE", &["30"]).unwrap(), Command::Delete(30, 30));
        assert!(parse("DELETE", &[]).unwrap_err().is(ErrorCode::SyntaxError));
        assert!(parse("LIST", &["TEN"]).unwrap_err().is(ErrorCode::SyntaxError));
    }

    #[test]
    fn test_files_and_carts() {
        assert_eq!(parse("SAVE", &[]).unwrap(), Command::Save(None));
        assert!(parse("LOAD", &[]).is_err());
        assert_eq!(
            parse("COPY", &["image", "a.png", "hero.png"]).unwrap(),
            Command::Copy {
                kind: AssetKind::Image,
                src: "a.png".to_string(),
                dest: "hero.png".to_string()
            }
        );
        assert!(parse("COPY", &["VIDEO", "a", "b"]).is_err());
    }

    #[test]
    fn test_switches() {
        assert_eq!(parse("VERBOSE", &["on"]).unwrap(), Command::Verbose(Some(true)));
        assert_eq!(
            parse("OPTIMIZE", &["PEEPHOLE", "OFF"]).unwrap(),
            Command::Optimize(Some((Pass::Peephole, Some(false))))
        );
        assert!(parse("VERBOSE", &["MAYBE"]).is_err());
    }

    #[test]
    fn test_unknown_and_known() {
        assert_eq!(
            parse("FROB", &["1"]).unwrap(),
            Command::Unknown("FROB".to_string())
        );
        assert!(Command::is_known("list"));
        assert!(Command::is_known("LOAD"));
        assert!(Command::is_known("COPY"));
        assert!(!Command::is_known("PRINT"));
    }
}
