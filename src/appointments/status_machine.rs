// Appointment status machine

use super::models::AppointmentStatus;

/// Transitions allowed between appointment statuses
///
/// Scheduled is the only live state; completed and cancelled are terminal
/// except that re-applying the same terminal status is accepted as a no-op.
pub struct StatusMachine;

impl StatusMachine {
    /// Whether moving from `from` to `to` is permitted
    pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
        match (from, to) {
            (AppointmentStatus::Scheduled, AppointmentStatus::Completed) => true,
            (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled) => true,
            // Idempotent repeats
            (from, to) if from == to => true,
            _ => false,
        }
    }

    /// True when the transition is a repeat of the current status and
    /// should not touch the row
    pub fn is_noop(from: AppointmentStatus, to: AppointmentStatus) -> bool {
        from == to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_can_complete_or_cancel() {
        assert!(StatusMachine::can_transition(
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed
        ));
        assert!(StatusMachine::can_transition(
            AppointmentStatus::Scheduled,
            AppointmentStatus::Cancelled
        ));
    }

    #[test]
    fn test_terminal_states_do_not_cross() {
        assert!(!StatusMachine::can_transition(
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled
        ));
        assert!(!StatusMachine::can_transition(
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed
        ));
        assert!(!StatusMachine::can_transition(
            AppointmentStatus::Completed,
            AppointmentStatus::Scheduled
        ));
    }

    #[test]
    fn test_same_status_is_an_idempotent_noop() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert!(StatusMachine::can_transition(status, status));
            assert!(StatusMachine::is_noop(status, status));
        }
    }
}
