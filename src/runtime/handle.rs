use tokio::sync::{broadcast, mpsc, oneshot};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    appointment::{Appointment, AppointmentKey},
    core::directory::{Directory, DirectoryError, DirectorySnapshotV1},
    validate::fold_username,
};

use super::events::SchedulerEvent;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("scheduler runtime is not running")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub event_queue_bound: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_queue_bound: 1024,
        }
    }
}

#[derive(Clone)]
pub struct SchedulerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<SchedulerEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    AddUser {
        username: String,
        resp: Reply<()>,
    },
    DeleteUser {
        username: String,
        resp: Reply<()>,
    },
    ListUsers {
        resp: oneshot::Sender<Vec<String>>,
    },
    Schedule {
        username: String,
        date: String,
        start: String,
        end: String,
        purpose: String,
        resp: Reply<()>,
    },
    Find {
        username: String,
        date: String,
        start: String,
        resp: Reply<Appointment>,
    },
    Cancel {
        username: String,
        date: String,
        start: String,
        resp: Reply<Appointment>,
    },
    Purpose {
        username: String,
        date: String,
        start: String,
        resp: Reply<String>,
    },
    Reschedule {
        username: String,
        date: String,
        start: String,
        new_date: String,
        new_start: String,
        new_end: String,
        resp: Reply<()>,
    },
    Appointments {
        username: String,
        resp: Reply<Vec<Appointment>>,
    },
    Snapshot {
        resp: oneshot::Sender<DirectorySnapshotV1>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

pub fn spawn_scheduler(directory: Directory, config: RuntimeConfig) -> SchedulerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<SchedulerEvent>(config.event_queue_bound);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut directory = directory;
        info!(users = directory.len(), "scheduler runtime started");

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut directory, &events_tx_loop) {
                break;
            }
        }

        info!("scheduler runtime stopped");
    });

    SchedulerHandle { cmd_tx, events_tx }
}

impl SchedulerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events_tx.subscribe()
    }

    pub async fn add_user(&self, username: impl Into<String>) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::AddUser {
            username: username.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn delete_user(&self, username: impl Into<String>) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::DeleteUser {
            username: username.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn list_users(&self) -> Result<Vec<String>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ListUsers { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn schedule_appointment(
        &self,
        username: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Schedule {
            username: username.into(),
            date: date.into(),
            start: start.into(),
            end: end.into(),
            purpose: purpose.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn find_appointment(
        &self,
        username: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
    ) -> Result<Appointment, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Find {
            username: username.into(),
            date: date.into(),
            start: start.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn cancel_appointment(
        &self,
        username: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
    ) -> Result<Appointment, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Cancel {
            username: username.into(),
            date: date.into(),
            start: start.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn get_purpose(
        &self,
        username: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
    ) -> Result<String, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Purpose {
            username: username.into(),
            date: date.into(),
            start: start.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn reschedule(
        &self,
        username: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
        new_date: impl Into<String>,
        new_start: impl Into<String>,
        new_end: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Reschedule {
            username: username.into(),
            date: date.into(),
            start: start.into(),
            new_date: new_date.into(),
            new_start: new_start.into(),
            new_end: new_end.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn appointments(
        &self,
        username: impl Into<String>,
    ) -> Result<Vec<Appointment>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Appointments {
            username: username.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn snapshot(&self) -> Result<DirectorySnapshotV1, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    directory: &mut Directory,
    events_tx: &broadcast::Sender<SchedulerEvent>,
) -> bool {
    match cmd {
        Command::AddUser { username, resp } => {
            let res = directory.add_user(&username).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(SchedulerEvent::UserAdded {
                    username: fold_username(&username),
                });
            }
            let _ = resp.send(res);
        }
        Command::DeleteUser { username, resp } => {
            let res = directory.delete_user(&username).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(SchedulerEvent::UserDeleted {
                    username: fold_username(&username),
                });
            }
            let _ = resp.send(res);
        }
        Command::ListUsers { resp } => {
            let users = directory
                .list_users()
                .into_iter()
                .map(str::to_string)
                .collect();
            let _ = resp.send(users);
        }
        Command::Schedule {
            username,
            date,
            start,
            end,
            purpose,
            resp,
        } => {
            let res = directory
                .schedule_appointment(&username, &date, &start, &end, &purpose)
                .map_err(RuntimeError::from);
            if res.is_ok() {
                if let Some(key) = last_key(directory, &username) {
                    let _ = events_tx.send(SchedulerEvent::AppointmentScheduled {
                        username: fold_username(&username),
                        key,
                    });
                }
            }
            let _ = resp.send(res);
        }
        Command::Find {
            username,
            date,
            start,
            resp,
        } => {
            let res = directory
                .find_appointment(&username, &date, &start)
                .cloned()
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Cancel {
            username,
            date,
            start,
            resp,
        } => {
            let res = directory
                .cancel_appointment(&username, &date, &start)
                .map_err(RuntimeError::from);
            if let Ok(removed) = &res {
                let _ = events_tx.send(SchedulerEvent::AppointmentCancelled {
                    username: fold_username(&username),
                    key: removed.key(),
                });
            }
            let _ = resp.send(res);
        }
        Command::Purpose {
            username,
            date,
            start,
            resp,
        } => {
            let res = directory
                .get_purpose(&username, &date, &start)
                .map(str::to_string)
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Reschedule {
            username,
            date,
            start,
            new_date,
            new_start,
            new_end,
            resp,
        } => {
            let from = directory
                .find_appointment(&username, &date, &start)
                .map(Appointment::key)
                .ok();
            let res = directory
                .reschedule(&username, &date, &start, &new_date, &new_start, &new_end)
                .map_err(RuntimeError::from);
            if res.is_ok() {
                if let (Some(from), Some(to)) = (from, last_key(directory, &username)) {
                    let _ = events_tx.send(SchedulerEvent::AppointmentRescheduled {
                        username: fold_username(&username),
                        from,
                        to,
                    });
                }
            }
            let _ = resp.send(res);
        }
        Command::Appointments { username, resp } => {
            let res = directory
                .diary(&username)
                .map(|diary| diary.as_slice().to_vec())
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(directory.export_snapshot());
        }
        Command::Shutdown { resp } => {
            debug!("scheduler runtime shutting down");
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn last_key(directory: &Directory, username: &str) -> Option<AppointmentKey> {
    directory
        .diary(username)
        .ok()
        .and_then(|diary| diary.as_slice().last())
        .map(Appointment::key)
}
