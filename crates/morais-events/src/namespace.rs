//! Prefixing views over a dispatcher.

use crate::dispatcher::{EventDispatcher, Subscription};
use crate::error::EventResult;
use crate::event::EventArgs;
use crate::listener::{Callback, ListenerOptions};

/// Separator between a namespace prefix and an event name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// A view that rewrites every event name to `"{prefix}:{event}"`.
///
/// The view owns no registry of its own: listeners live in the parent
/// dispatcher and are visible there under their qualified names.
#[derive(Debug, Clone)]
pub struct Namespace {
    dispatcher: EventDispatcher,
    prefix: String,
}

impl Namespace {
    pub(crate) fn new(dispatcher: EventDispatcher, prefix: &str) -> Self {
        Self {
            dispatcher,
            prefix: prefix.to_owned(),
        }
    }

    /// The namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Qualified name of `event` in this namespace.
    #[must_use]
    pub fn qualify(&self, event: &str) -> String {
        format!("{}{NAMESPACE_SEPARATOR}{event}", self.prefix)
    }

    /// A nested namespace, `"{prefix}:{child}"`.
    #[must_use]
    pub fn namespace(&self, child: &str) -> Self {
        Self::new(self.dispatcher.clone(), &self.qualify(child))
    }

    /// See [`EventDispatcher::on`].
    ///
    /// # Errors
    ///
    /// Same as [`EventDispatcher::on`].
    pub fn on(
        &self,
        event: &str,
        callback: Callback,
        options: ListenerOptions,
    ) -> EventResult<Subscription> {
        self.dispatcher.on(&self.qualify(event), callback, options)
    }

    /// See [`EventDispatcher::once`].
    ///
    /// # Errors
    ///
    /// Same as [`EventDispatcher::once`].
    pub fn once(
        &self,
        event: &str,
        callback: Callback,
        options: ListenerOptions,
    ) -> EventResult<Subscription> {
        self.dispatcher.once(&self.qualify(event), callback, options)
    }

    /// See [`EventDispatcher::off`].
    pub fn off(&self, event: &str, callback: &Callback) -> bool {
        self.dispatcher.off(&self.qualify(event), callback)
    }

    /// See [`EventDispatcher::emit`].
    pub fn emit(&self, event: &str, args: EventArgs) -> bool {
        self.dispatcher.emit(&self.qualify(event), args)
    }

    /// See [`EventDispatcher::emit_async`].
    pub async fn emit_async(&self, event: &str, args: EventArgs) -> bool {
        self.dispatcher.emit_async(&self.qualify(event), args).await
    }

    /// Remove listeners of one event in this namespace, or of every event
    /// whose name starts with `"{prefix}:"` when `None`.
    ///
    /// Returns the number of listeners removed.
    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        match event {
            Some(name) => self
                .dispatcher
                .remove_all_listeners(Some(&self.qualify(name))),
            None => {
                let scope = self.qualify("");
                self.dispatcher
                    .remove_events(|candidate| candidate.starts_with(&scope))
            },
        }
    }

    /// See [`EventDispatcher::listener_count`].
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.dispatcher.listener_count(&self.qualify(event))
    }

    /// Unqualified names of the events registered in this namespace.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let scope = self.qualify("");
        self.dispatcher
            .event_names()
            .into_iter()
            .filter_map(|name| name.strip_prefix(&scope).map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_qualify() {
        let dispatcher = EventDispatcher::new();
        let auth = dispatcher.namespace("auth");

        assert_eq!(auth.prefix(), "auth");
        assert_eq!(auth.qualify("login"), "auth:login");
        assert_eq!(auth.namespace("token").qualify("refresh"), "auth:token:refresh");
    }

    #[test]
    fn test_namespaced_emit_reaches_namespaced_listener_only() {
        let dispatcher = EventDispatcher::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        dispatcher
            .namespace("auth")
            .on(
                "login",
                Callback::new(move |event| {
                    sink.lock().unwrap().push(event.args().to_vec());
                    Ok(())
                }),
                ListenerOptions::new(),
            )
            .unwrap();

        assert!(!dispatcher.emit("login", vec![json!("x")]));
        assert!(received.lock().unwrap().is_empty());

        assert!(dispatcher.namespace("auth").emit("login", vec![json!("x")]));
        assert_eq!(*received.lock().unwrap(), vec![vec![json!("x")]]);

        assert!(dispatcher.has_listeners("auth:login"));
    }

    #[test]
    fn test_remove_all_listeners_is_prefix_scoped() {
        let dispatcher = EventDispatcher::new();
        let noop = Callback::new(|_| Ok(()));
        let auth = dispatcher.namespace("auth");

        auth.on("login", noop.clone(), ListenerOptions::new()).unwrap();
        auth.on("logout", noop.clone(), ListenerOptions::new()).unwrap();
        dispatcher
            .on("authority", noop.clone(), ListenerOptions::new())
            .unwrap();
        dispatcher
            .namespace("quiz")
            .on("answered", noop, ListenerOptions::new())
            .unwrap();

        assert_eq!(auth.event_names(), vec!["login", "logout"]);
        assert_eq!(auth.remove_all_listeners(None), 2);
        assert_eq!(dispatcher.event_names(), vec!["authority", "quiz:answered"]);
    }

    #[test]
    fn test_remove_all_listeners_single_event() {
        let dispatcher = EventDispatcher::new();
        let noop = Callback::new(|_| Ok(()));
        let auth = dispatcher.namespace("auth");

        auth.on("login", noop.clone(), ListenerOptions::new()).unwrap();
        auth.on("logout", noop, ListenerOptions::new()).unwrap();

        assert_eq!(auth.remove_all_listeners(Some("login")), 1);
        assert_eq!(auth.listener_count("login"), 0);
        assert_eq!(auth.listener_count("logout"), 1);
    }

    #[test]
    fn test_off_through_namespace() {
        let dispatcher = EventDispatcher::new();
        let cb = Callback::new(|_| Ok(()));
        let vocab = dispatcher.namespace("vocab");

        vocab.once("learned", cb.clone(), ListenerOptions::new()).unwrap();
        assert!(vocab.off("learned", &cb));
        assert!(!vocab.off("learned", &cb));
        assert!(dispatcher.event_names().is_empty());
    }

    #[tokio::test]
    async fn test_emit_async_through_namespace() {
        let dispatcher = EventDispatcher::new();
        let lessons = dispatcher.namespace("lesson");

        lessons
            .on(
                "completed",
                Callback::new_async(|event| async move {
                    assert_eq!(event.name(), "lesson:completed");
                    Ok::<(), crate::ListenerError>(())
                }),
                ListenerOptions::new(),
            )
            .unwrap();

        assert!(lessons.emit_async("completed", vec![]).await);
    }
}
