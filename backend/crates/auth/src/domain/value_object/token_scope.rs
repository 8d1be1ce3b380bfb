use derive_more::Display;
use serde::{Deserialize, Serialize};

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenScope {
    #[display("activation")]
    Activation,
    #[display("authentication")]
    Authentication,
    #[display("password-reset")]
    PasswordReset,
}

impl TokenScope {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use TokenScope::*;
        match self {
            Activation => "activation",
            Authentication => "authentication",
            PasswordReset => "password-reset",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        use TokenScope::*;
        match code {
            "activation" => Some(Activation),
            "authentication" => Some(Authentication),
            "password-reset" => Some(PasswordReset),
            _ => None,
        }
    }
}
