use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{EmployeeId, EventRecord};
use crate::errors::ResolutionError;

/// Source of scheduled events keyed by employee id. The conflict checker only
/// depends on this seam, so a real calendar backend can be injected without
/// touching it. Unknown employees yield an empty list, never an error.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn events_for(&self, employee_id: EmployeeId) -> Result<Vec<EventRecord>, ResolutionError>;
}

/// In-memory event table seeded with the demo calendar.
#[derive(Clone, Debug, Default)]
pub struct StaticEventTable {
    events: HashMap<EmployeeId, Vec<EventRecord>>,
}

impl StaticEventTable {
    pub fn new(events: HashMap<EmployeeId, Vec<EventRecord>>) -> Self {
        Self { events }
    }

    /// The demo calendar: five employees, one of them with a clear schedule.
    pub fn demo() -> Self {
        let mut events = HashMap::new();
        events.insert(
            EmployeeId(1),
            vec![
                EventRecord::new("Meeting with CEO", "Plan for Q3", "2025-02-10", "2025-02-10"),
                EventRecord::new("Budget Allocation", "Funds distribution", "2025-02-11", "2025-02-11"),
            ],
        );
        events.insert(
            EmployeeId(2),
            vec![
                EventRecord::new("Team Progress Review", "Weekly updates", "2025-03-02", "2025-03-02"),
                EventRecord::new("Client Feedback", "Improvements needed", "2025-03-04", "2025-03-04"),
            ],
        );
        events.insert(EmployeeId(3), Vec::new());
        events.insert(
            EmployeeId(4),
            vec![EventRecord::new("Hiring Plans", "New recruitments", "2025-04-07", "2025-04-07")],
        );
        events.insert(
            EmployeeId(5),
            vec![
                EventRecord::new("Security Updates", "New protocols", "2024-02-26", "2024-02-27"),
                EventRecord::new("Tech Stack Upgrade", "Software improvements", "2024-03-07", "2024-03-07"),
            ],
        );
        Self::new(events)
    }
}

#[async_trait]
impl EventSource for StaticEventTable {
    async fn events_for(&self, employee_id: EmployeeId) -> Result<Vec<EventRecord>, ResolutionError> {
        Ok(self.events.get(&employee_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{EventSource, StaticEventTable};
    use crate::domain::EmployeeId;

    #[tokio::test]
    async fn known_employee_returns_scheduled_events() {
        let table = StaticEventTable::demo();
        let events = table.events_for(EmployeeId(1)).await.expect("lookup should succeed");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, "Meeting with CEO");
    }

    #[tokio::test]
    async fn unknown_employee_yields_empty_list_without_failing() {
        let table = StaticEventTable::demo();
        let events = table.events_for(EmployeeId(99)).await.expect("lookup should succeed");
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn employee_with_clear_schedule_yields_empty_list() {
        let table = StaticEventTable::demo();
        let events = table.events_for(EmployeeId(3)).await.expect("lookup should succeed");
        assert!(events.is_empty());
    }
}
