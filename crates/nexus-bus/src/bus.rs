/// In-process pub/sub bus: unicast, multicast, and request/reply with
/// request-id correlation.
///
/// The subscription tables mirror `src/dev/nn_dev_pubsub.c`/`.h`; `query`'s
/// one-shot reply slot is the usual `oneshot`-channel request/response
/// idiom for correlating an async call with its eventual answer.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::BusError;
use crate::mailbox::Mailbox;
use crate::message::Message;

#[derive(Debug, Clone)]
struct ModuleEntry {
    mailbox: Mailbox,
}

#[derive(Debug, Default)]
struct Group {
    owner_id: u32,
    members: Vec<u32>,
}

/// Tables guarded by one coarse mutex. Mailbox dispatch happens *after*
/// the lock is released to avoid lock inversion with the mailbox's own
/// mutex.
#[derive(Default)]
struct Tables {
    modules: HashMap<u32, ModuleEntry>,
    unicast: HashMap<(u32, u32), Vec<u32>>,
    groups: HashMap<u32, Group>,
    pending: HashMap<u32, oneshot::Sender<Message>>,
}

pub struct Bus {
    tables: Mutex<Tables>,
    next_request_id: AtomicU32,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            next_request_id: AtomicU32::new(1),
        }
    }

    pub fn register(&self, module_id: u32, mailbox: Mailbox) {
        let mut t = self.tables.lock().unwrap();
        t.modules.insert(module_id, ModuleEntry { mailbox });
    }

    /// Removes a module and drops it from every subscription list and
    /// group membership it appeared in.
    pub fn unregister(&self, module_id: u32) {
        let mut t = self.tables.lock().unwrap();
        t.modules.remove(&module_id);
        t.unicast.retain(|&(publisher, _), subs| {
            subs.retain(|&s| s != module_id);
            publisher != module_id || !subs.is_empty()
        });
        t.groups.retain(|_, g| g.owner_id != module_id);
        for g in t.groups.values_mut() {
            g.members.retain(|&m| m != module_id);
        }
    }

    pub fn subscribe(&self, subscriber_id: u32, publisher_id: u32, event_id: u32) {
        let mut t = self.tables.lock().unwrap();
        t.unicast
            .entry((publisher_id, event_id))
            .or_default()
            .push(subscriber_id);
    }

    pub fn create_group(&self, group_id: u32, owner_id: u32) -> Result<(), BusError> {
        let mut t = self.tables.lock().unwrap();
        if t.groups.contains_key(&group_id) {
            return Err(BusError::DuplicateGroup(group_id));
        }
        t.groups.insert(
            group_id,
            Group {
                owner_id,
                members: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn join_group(&self, group_id: u32, member_id: u32) -> Result<(), BusError> {
        let mut t = self.tables.lock().unwrap();
        let g = t
            .groups
            .get_mut(&group_id)
            .ok_or(BusError::UnknownGroup(group_id))?;
        if !g.members.contains(&member_id) {
            g.members.push(member_id);
        }
        Ok(())
    }

    pub fn leave_group(&self, group_id: u32, member_id: u32) -> Result<(), BusError> {
        let mut t = self.tables.lock().unwrap();
        let g = t
            .groups
            .get_mut(&group_id)
            .ok_or(BusError::UnknownGroup(group_id))?;
        g.members.retain(|&m| m != member_id);
        Ok(())
    }

    /// Only `owner_id` may destroy a group it created.
    pub fn destroy_group(&self, group_id: u32, owner_id: u32) -> Result<(), BusError> {
        let mut t = self.tables.lock().unwrap();
        let owner = t
            .groups
            .get(&group_id)
            .ok_or(BusError::UnknownGroup(group_id))?
            .owner_id;
        if owner != owner_id {
            return Err(BusError::NotGroupOwner {
                group: group_id,
                owner,
                actor: owner_id,
            });
        }
        t.groups.remove(&group_id);
        Ok(())
    }

    /// Fan out a cloned message to every current subscriber of
    /// `(publisher_id, event_id)`.
    pub fn publish(&self, publisher_id: u32, event_id: u32, msg: &Message) {
        let targets: Vec<Mailbox> = {
            let t = self.tables.lock().unwrap();
            t.unicast
                .get(&(publisher_id, event_id))
                .into_iter()
                .flatten()
                .filter_map(|sub| t.modules.get(sub).map(|m| m.mailbox.clone()))
                .collect()
        };
        for mailbox in targets {
            let _ = mailbox.send(msg.cloned_for_delivery());
        }
    }

    /// Direct unicast send to one module's mailbox.
    pub fn send(&self, target_id: u32, msg: Message) -> Result<(), BusError> {
        let mailbox = {
            let t = self.tables.lock().unwrap();
            t.modules
                .get(&target_id)
                .map(|m| m.mailbox.clone())
                .ok_or(BusError::UnknownModule(target_id))?
        };
        mailbox.send(msg)
    }

    /// The reply side of a query. If a waiter is registered for
    /// `msg.request_id`, deliver straight to that waiter's one-shot slot
    /// instead of the mailbox.
    pub fn send_response(&self, target_id: u32, msg: Message) -> Result<(), BusError> {
        let waiter = {
            let mut t = self.tables.lock().unwrap();
            t.pending.remove(&msg.request_id)
        };
        if let Some(waiter) = waiter {
            // A dropped receiver means the query already timed out; the
            // late-arriving reply is simply discarded.
            let _ = waiter.send(msg);
            Ok(())
        } else {
            self.send(target_id, msg)
        }
    }

    /// Allocate a fresh non-zero `request_id`, publish as a unicast send to
    /// `target_id`, then wait up to `timeout_ms` for the correlated reply.
    pub async fn query(
        &self,
        sender_id: u32,
        target_id: u32,
        mut msg: Message,
        timeout_ms: u64,
    ) -> Option<Message> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst).max(1);
        msg.sender_id = sender_id;
        msg.request_id = request_id;

        let (tx, rx) = oneshot::channel();
        {
            let mut t = self.tables.lock().unwrap();
            t.pending.insert(request_id, tx);
        }

        if let Err(e) = self.send(target_id, msg) {
            tracing::warn!(%e, target_id, "query send failed");
            self.tables.lock().unwrap().pending.remove(&request_id);
            return None;
        }

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), rx).await;
        // Remove the slot either way: a completed query's slot was already
        // consumed by send_response; a timed-out one must not linger.
        self.tables.lock().unwrap().pending.remove(&request_id);

        match result {
            Ok(Ok(reply)) => Some(reply),
            _ => None,
        }
    }
}
