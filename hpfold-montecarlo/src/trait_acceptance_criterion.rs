/// Decides whether a proposed move, scored `energy_before` -> `energy_after`,
/// should be accepted.
pub trait AcceptanceCriterion {
    /// Returns `true` if a move with this energy change should be accepted.
    fn check(&mut self, energy_before: f64, energy_after: f64) -> bool;

    fn name(&self) -> String {
        String::from("AcceptanceCriterion")
    }
}
