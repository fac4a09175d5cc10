use std::str::FromStr;

use thiserror::Error;

#[derive(PartialEq, Eq, Clone, Copy, Hash, derive_more::Display, Debug)]
pub enum Style {
    #[display(fmt = "Math")]
    Math,
    #[display(fmt = "Code")]
    Code,
}

/// Which printed element of an abstraction a UI treats as the clickable
/// "reduce here" control. Carried as configuration only.
#[derive(PartialEq, Eq, Clone, Copy, Hash, derive_more::Display, Debug)]
pub enum Handle {
    #[display(fmt = "lambda-symbol")]
    LambdaSymbol,
    #[display(fmt = "connector")]
    Connector,
}

/// The closed set of supported notation flavors.
#[derive(PartialEq, Eq, Clone, Copy, Hash, derive_more::Display, Debug)]
pub enum Lang {
    #[display(fmt = "Python")]
    Python,
    #[display(fmt = "JavaScript")]
    JavaScript,
    #[display(fmt = "TeX")]
    Tex,
}

/// How one notation flavor renders an abstraction and an application.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct LangInfo {
    /// Introduces a binder, e.g. `lambda ` or `𝜆`; may be empty.
    pub lambda_symbol: &'static str,
    /// Sits between the bound variable and the body.
    pub connector: &'static str,
    /// Whether consecutive binders merge into one multi-parameter header.
    pub multi_arg: bool,
    pub style: Style,
    /// Whether application arguments are parenthesized unconditionally.
    pub parenthesize_arg: bool,
    pub abstraction_handle: Handle,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Python, Lang::JavaScript, Lang::Tex];

    pub fn info(self) -> &'static LangInfo {
        match self {
            Lang::Python => &LangInfo {
                lambda_symbol: "lambda ",
                connector: ": ",
                multi_arg: false,
                style: Style::Code,
                parenthesize_arg: true,
                abstraction_handle: Handle::LambdaSymbol,
            },
            Lang::JavaScript => &LangInfo {
                lambda_symbol: "",
                connector: " => ",
                multi_arg: false,
                style: Style::Code,
                parenthesize_arg: true,
                abstraction_handle: Handle::Connector,
            },
            Lang::Tex => &LangInfo {
                lambda_symbol: "𝜆",
                connector: ".",
                multi_arg: true,
                style: Style::Math,
                parenthesize_arg: false,
                abstraction_handle: Handle::LambdaSymbol,
            },
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown language `{0}`, expected python, js, or tex")]
pub struct UnknownLang(String);

impl FromStr for Lang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "py" | "python" => Ok(Lang::Python),
            "js" | "javascript" => Ok(Lang::JavaScript),
            "tex" | "math" => Ok(Lang::Tex),
            _ => Err(UnknownLang(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_accepts_aliases() {
        assert_eq!("py".parse::<Lang>().unwrap(), Lang::Python);
        assert_eq!("JavaScript".parse::<Lang>().unwrap(), Lang::JavaScript);
        assert_eq!("tex".parse::<Lang>().unwrap(), Lang::Tex);
        assert!("haskell".parse::<Lang>().is_err());
    }

    #[test]
    fn descriptors_are_consistent() {
        for lang in Lang::ALL {
            let info = lang.info();
            // A notation must have something to anchor the binder on.
            assert!(!info.lambda_symbol.is_empty() || !info.connector.trim().is_empty());
        }
        assert!(Lang::Tex.info().multi_arg);
        assert!(!Lang::Python.info().multi_arg);
    }
}
