pub type CastResult<T> = Result<T, CastError>;

#[derive(thiserror::Error, Debug)]
pub enum CastError {
    #[error("input error: {0}")]
    Input(String),

    #[error("player asset error: {0}")]
    Assets(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("player error: {0}")]
    Player(String),

    #[error("recording error: {0}")]
    Record(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CastError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn assets(msg: impl Into<String>) -> Self {
        Self::Assets(msg.into())
    }

    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    pub fn player(msg: impl Into<String>) -> Self {
        Self::Player(msg.into())
    }

    pub fn record(msg: impl Into<String>) -> Self {
        Self::Record(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(CastError::input("x").to_string().contains("input error:"));
        assert!(
            CastError::assets("x")
                .to_string()
                .contains("player asset error:")
        );
        assert!(
            CastError::browser("x")
                .to_string()
                .contains("browser error:")
        );
        assert!(CastError::player("x").to_string().contains("player error:"));
        assert!(
            CastError::record("x")
                .to_string()
                .contains("recording error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = CastError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
