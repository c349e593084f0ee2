use std::time::Duration;

use apptbook::{
    appointment::AppointmentKey,
    core::directory::{Directory, DirectoryError},
    runtime::{
        events::SchedulerEvent,
        handle::{spawn_scheduler, RuntimeConfig, RuntimeError},
    },
    validate::{parse_date, parse_time},
};

fn key(date: &str, start: &str) -> AppointmentKey {
    AppointmentKey {
        date: parse_date(date).unwrap(),
        start: parse_time(start).unwrap(),
    }
}

#[tokio::test]
async fn runtime_mutations_emit_ordered_events() {
    let handle = spawn_scheduler(Directory::new(), RuntimeConfig::default());
    let mut sub = handle.subscribe();

    handle.add_user("Bob").await.expect("add");
    handle
        .schedule_appointment("bob", "2023-06-01", "10:00 AM", "11:00 AM", "lunch")
        .await
        .expect("schedule");
    handle
        .reschedule("bob", "2023-06-01", "10:00 AM", "2023-06-02", "01:00 PM", "02:00 PM")
        .await
        .expect("reschedule");
    let removed = handle
        .cancel_appointment("bob", "2023-06-02", "01:00 PM")
        .await
        .expect("cancel");
    assert_eq!(removed.purpose, "lunch");
    handle.delete_user("bob").await.expect("delete");

    let mut seen = Vec::new();
    for _ in 0..5 {
        let evt = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("event")
            .expect("recv");
        seen.push(evt);
    }

    let bob = "bob".to_string();
    assert_eq!(
        seen,
        vec![
            SchedulerEvent::UserAdded {
                username: bob.clone()
            },
            SchedulerEvent::AppointmentScheduled {
                username: bob.clone(),
                key: key("2023-06-01", "10:00 AM"),
            },
            SchedulerEvent::AppointmentRescheduled {
                username: bob.clone(),
                from: key("2023-06-01", "10:00 AM"),
                to: key("2023-06-02", "01:00 PM"),
            },
            SchedulerEvent::AppointmentCancelled {
                username: bob.clone(),
                key: key("2023-06-02", "01:00 PM"),
            },
            SchedulerEvent::UserDeleted { username: bob },
        ]
    );

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn runtime_queries_and_errors() {
    let handle = spawn_scheduler(Directory::new(), RuntimeConfig::default());

    handle.add_user("carol").await.expect("add");
    handle.add_user("alice").await.expect("add");
    assert_eq!(
        handle.list_users().await.expect("list"),
        vec!["alice".to_string(), "carol".to_string()]
    );

    handle
        .schedule_appointment("alice", "2024-02-29", "09:00 AM", "09:30 AM", "standup")
        .await
        .expect("schedule");
    assert_eq!(
        handle
            .get_purpose("alice", "2024-02-29", "09:00 AM")
            .await
            .expect("purpose"),
        "standup"
    );
    let found = handle
        .find_appointment("ALICE", "2024-02-29", "09:00 AM")
        .await
        .expect("find");
    assert_eq!(found.end, parse_time("09:30 AM").unwrap());

    let err = handle
        .schedule_appointment("alice", "2023-03-01", "09:15 AM", "10:00 AM", "clash")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Directory(DirectoryError::TimeConflict {
            existing: key("2024-02-29", "09:00 AM"),
        })
    );

    let err = handle.add_user("alice").await.unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Directory(DirectoryError::AlreadyExists("alice".to_string()))
    );

    assert_eq!(handle.appointments("alice").await.expect("diary").len(), 1);
    assert_eq!(handle.snapshot().await.expect("snapshot").users.len(), 2);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn failed_requests_emit_no_events() {
    let handle = spawn_scheduler(Directory::new(), RuntimeConfig::default());
    let mut sub = handle.subscribe();

    assert!(handle.delete_user("ghost").await.is_err());
    assert!(handle.add_user("bad name").await.is_err());
    handle.add_user("ok").await.expect("add");

    let evt = tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event")
        .expect("recv");
    assert_eq!(
        evt,
        SchedulerEvent::UserAdded {
            username: "ok".to_string()
        }
    );

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn requests_after_shutdown_report_closed_channel() {
    let handle = spawn_scheduler(Directory::new(), RuntimeConfig::default());
    handle.shutdown().await.expect("shutdown");

    // Let the task observe the shutdown and drop its receiver.
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        handle.add_user("late").await,
        Err(RuntimeError::ChannelClosed)
    );
}
