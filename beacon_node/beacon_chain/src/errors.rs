use types::ConfigError;

#[derive(Debug, PartialEq)]
pub enum BeaconChainError {
    InvalidValidatorPubkeyBytes(bls::Error),
    InconsistentPreset(ConfigError),
}

impl From<ConfigError> for BeaconChainError {
    fn from(e: ConfigError) -> Self {
        BeaconChainError::InconsistentPreset(e)
    }
}
