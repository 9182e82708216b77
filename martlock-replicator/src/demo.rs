use martlock_consumer::{ChangeEvent, ChangeEventConsumer, InMemoryChangeEventConsumer};
use martlock_core::ResourceKey;
use martlock_projection::project;
use martlock_schema::{ColumnSpec, ColumnType, TableSpec};
use martlock_scheduler::{SchedulingService, Task, TaskOutcome};
use serde_json::json;
use tracing::{info, warn};

/// Builds the `entities` table the demo projects against, a handful of
/// in-memory change events, and drains them through `scheduler`, one
/// lock-gated task per event.
pub fn run(scheduler: &SchedulingService) {
    let table = entities_table();
    let consumer = seed_consumer();

    while let Some(event) = consumer.poll() {
        let event_id = event.event_id;
        let resource_key = event.resource_key.clone();
        let mut keys = std::collections::HashSet::new();
        keys.insert(resource_key.clone());

        let table = table.clone();
        let task = Task::new(keys, move || {
            let row = project(&event, &table).map_err(|err| err.to_string())?;
            info!(?row, "projected row");
            Ok(())
        });

        match scheduler.submit(task) {
            Ok(TaskOutcome::Completed) => consumer.ack(event_id),
            Ok(TaskOutcome::LockContended) => {
                warn!(event_id, %resource_key, "lock contended, leaving event unacknowledged");
                consumer.nack(event_id);
            }
            Ok(outcome) => {
                warn!(event_id, ?outcome, "task did not complete cleanly");
                consumer.nack(event_id);
            }
            Err(err) => {
                warn!(event_id, error = %err, "scheduler rejected task");
                consumer.nack(event_id);
            }
        }
    }
}

fn entities_table() -> TableSpec {
    TableSpec::new(
        "entities",
        vec![
            ColumnSpec::new("entity_key", ColumnType::ResourceKey).primary_key(),
            ColumnSpec::new("name", ColumnType::Text).not_null(),
            ColumnSpec::new("updated_at", ColumnType::Timestamp),
        ],
    )
    .expect("entities table always declares at least one column")
}

fn seed_consumer() -> InMemoryChangeEventConsumer {
    let consumer = InMemoryChangeEventConsumer::new();
    consumer.push(ChangeEvent::new(
        1,
        ResourceKey::new("ENTITY", ["100"]).unwrap(),
        json!({"name": "Acme Corp"}),
    ));
    consumer.push(ChangeEvent::new(
        2,
        ResourceKey::new("ENTITY", ["200"]).unwrap(),
        json!({"name": "Globex"}),
    ));
    consumer
}
