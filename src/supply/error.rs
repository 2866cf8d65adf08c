use thiserror::Error;

/// Errors raised by the material-supply timeline. As with
/// [`crate::momentum::MomentumError`], ordinary infeasibility
/// (`NoSupply`) is surfaced as the `+∞` sentinel, not an `Err` — only
/// invariant violations are true errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupplyError {
    #[error("no depot in the landscape offers material `{0}`")]
    NoDepotForMaterial(String),
    #[error("supply overdraw: depot `{depot_id}` went negative for material `{material}`")]
    Overdraw { depot_id: String, material: String },
}
