use thiserror::Error;

/// Errors raised by the momentum (worker-capacity) timeline.
///
/// `InfeasibleCapacity` is not represented here: per `SPEC_FULL.md` §7 it is
/// surfaced as the `+∞` sentinel from `find_min_start`/`earliest_fit`, not
/// as an `Err`, since the caller is expected to try another contractor
/// rather than unwind an error. Only invariant violations — caller bugs —
/// are true errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MomentumError {
    #[error("commit would drive available headcount negative for specialty `{specialty}` on contractor `{contractor_id}`")]
    NegativeAvailability {
        contractor_id: String,
        specialty: String,
    },
    #[error("no capacity timeline registered for contractor `{0}`")]
    UnknownContractor(String),
}
