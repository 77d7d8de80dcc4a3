//! Processor that logs every event it is routed.

use crate::config::RouteConfig;
use crate::events::Action;
use crate::routing::{handler_fn, Handler, RouterBuilder};

use super::EventProcessor;

/// Logs events for the subjects and actions listed in `[[routes]]`.
#[derive(Debug, Clone, Default)]
pub struct EchoProcessor {
    routes: Vec<(String, Vec<Action>)>,
}

impl EchoProcessor {
    /// Build from validated route config. Unparseable actions are skipped.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let routes = routes
            .iter()
            .map(|route| {
                let actions = route
                    .actions
                    .iter()
                    .filter_map(|a| a.parse().ok())
                    .collect();
                (route.subject.clone(), actions)
            })
            .collect();
        Self { routes }
    }
}

impl EventProcessor for EchoProcessor {
    fn register(&self, router: &mut RouterBuilder) {
        for (subject, actions) in &self.routes {
            for action in actions {
                router.route(subject.clone(), *action, echo_handler(), Vec::new());
            }
        }
    }
}

fn echo_handler() -> Handler {
    handler_fn(|ctx, event| async move {
        tracing::info!(
            subject = %ctx.subject(),
            action = %event.action,
            resource_id = %event.extension_resource_id,
            correlation_id = ctx.correlation_id().unwrap_or_default(),
            "Received event"
        );
        Ok(())
    })
}
