//! Sending a message: optimistic local append, chat call, reconciliation.

use tracing::{info, warn};

use super::{EngineEvent, RenderSource, SyncEngine};
use crate::context::UserContext;
use crate::error::{ErrorContext, ResultExt, SyncResult, ValidationError};
use crate::models::{ChatReply, Message, PLACEHOLDER_TITLE};

impl SyncEngine {
    /// Send `text` in the active thread, creating one first if there is none.
    ///
    /// The user message is cached before the chat call and stays cached if
    /// the call fails. A denied session emits [`EngineEvent::ReauthRequired`].
    pub async fn send_message(&self, ctx: &UserContext, text: &str) -> SyncResult<ChatReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }

        let thread_id = match self.pointer.get(&ctx.user) {
            Some(id) => id,
            None => self.create_thread(ctx, PLACEHOLDER_TITLE).await?.id,
        };

        self.cache.append_message(&ctx.user, &thread_id, Message::user(text));
        self.render_cached(ctx, &thread_id);

        let reply = match self.api.chat(ctx, text, Some(&thread_id)).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.requires_reauth() {
                    warn!(user = %ctx.user, "Session rejected by server");
                    self.emit(EngineEvent::ReauthRequired);
                }
                let context = ErrorContext::new("send_message").with_thread_id(&thread_id);
                return Err(e.with_context(context));
            }
        };

        let thread_id = if reply.thread_id != thread_id {
            info!(
                from = %thread_id,
                to = %reply.thread_id,
                "Server moved conversation to another thread"
            );
            self.cache.rekey_thread(&ctx.user, &thread_id, &reply.thread_id);
            self.pointer.set(&ctx.user, Some(&reply.thread_id));
            reply.thread_id.clone()
        } else {
            thread_id
        };

        self.cache.append_message(
            &ctx.user,
            &thread_id,
            reply.to_message(),
        );
        self.render_cached(ctx, &thread_id);

        self.reconcile_after_send(ctx, &thread_id).await;
        Ok(reply)
    }

    fn render_cached(&self, ctx: &UserContext, thread_id: &str) {
        self.emit(EngineEvent::Rendered {
            thread_id: Some(thread_id.to_string()),
            messages: self.cache.read_thread(&ctx.user, thread_id),
            source: RenderSource::Local,
        });
    }

    /// Re-fetch the canonical thread and re-list. Failures are only logged.
    async fn reconcile_after_send(&self, ctx: &UserContext, thread_id: &str) {
        let refreshed = self.get_thread(ctx, thread_id).await.context(
            ErrorContext::new("reconcile")
                .with_thread_id(thread_id)
                .in_background(),
        );
        match refreshed {
            Ok(thread) => self.emit(EngineEvent::Rendered {
                thread_id: Some(thread_id.to_string()),
                messages: thread.messages,
                source: RenderSource::Server,
            }),
            Err(e) => warn!(error = %e, "Could not refresh thread after send"),
        }

        if let Err(e) = self.list_threads(ctx).await {
            warn!(error = %e, "Could not refresh thread list after send");
        }
    }
}
