//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps closures `Fn(WorkItem, ExecutionContext) -> Fut`, producing a fresh
//! future per invocation. Item and context are passed by value (cheap `Arc` clones) so the
//! future owns its state.
//!
//! ## Example
//! ```rust
//! use deploygate::{ListenerError, ListenerFn, ListenerRef};
//!
//! let l: ListenerRef = ListenerFn::arc_deploy_only("printer", |item, _cx| async move {
//!     println!("deployed {}", item.identity());
//!     Ok::<_, ListenerError>(())
//! });
//! assert_eq!(l.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{Ready, ready};

use crate::error::ListenerError;
use crate::items::{ExecutionContext, WorkItem};
use crate::listeners::listener::Listener;

/// Undeploy handler used by deploy-only listeners.
pub type NoopFn = fn(WorkItem, ExecutionContext) -> Ready<Result<(), ListenerError>>;

fn noop(_item: WorkItem, _cx: ExecutionContext) -> Ready<Result<(), ListenerError>> {
    ready(Ok(()))
}

/// Function-backed listener implementation.
#[derive(Debug)]
pub struct ListenerFn<D, U = NoopFn> {
    name: Cow<'static, str>,
    deploy: D,
    undeploy: U,
}

impl<D, U> ListenerFn<D, U> {
    /// Creates a listener from deploy and undeploy closures.
    pub fn new<DF, UF>(name: impl Into<Cow<'static, str>>, deploy: D, undeploy: U) -> Self
    where
        D: Fn(WorkItem, ExecutionContext) -> DF,
        DF: Future<Output = Result<(), ListenerError>>,
        U: Fn(WorkItem, ExecutionContext) -> UF,
        UF: Future<Output = Result<(), ListenerError>>,
    {
        Self {
            name: name.into(),
            deploy,
            undeploy,
        }
    }

    /// Same as [`ListenerFn::new`], returned as a shared handle.
    pub fn arc<DF, UF>(name: impl Into<Cow<'static, str>>, deploy: D, undeploy: U) -> Arc<Self>
    where
        D: Fn(WorkItem, ExecutionContext) -> DF,
        DF: Future<Output = Result<(), ListenerError>>,
        U: Fn(WorkItem, ExecutionContext) -> UF,
        UF: Future<Output = Result<(), ListenerError>>,
    {
        Arc::new(Self::new(name, deploy, undeploy))
    }
}

impl<D> ListenerFn<D, NoopFn> {
    /// Creates a listener that ignores undeploys.
    pub fn deploy_only<DF>(name: impl Into<Cow<'static, str>>, deploy: D) -> Self
    where
        D: Fn(WorkItem, ExecutionContext) -> DF,
        DF: Future<Output = Result<(), ListenerError>>,
    {
        Self::new(name, deploy, noop as NoopFn)
    }

    /// Same as [`ListenerFn::deploy_only`], returned as a shared handle.
    pub fn arc_deploy_only<DF>(name: impl Into<Cow<'static, str>>, deploy: D) -> Arc<Self>
    where
        D: Fn(WorkItem, ExecutionContext) -> DF,
        DF: Future<Output = Result<(), ListenerError>>,
    {
        Arc::new(Self::deploy_only(name, deploy))
    }
}

#[async_trait]
impl<D, DF, U, UF> Listener for ListenerFn<D, U>
where
    D: Fn(WorkItem, ExecutionContext) -> DF + Send + Sync + 'static,
    DF: Future<Output = Result<(), ListenerError>> + Send + 'static,
    U: Fn(WorkItem, ExecutionContext) -> UF + Send + Sync + 'static,
    UF: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_deploy(&self, item: &WorkItem, cx: &ExecutionContext) -> Result<(), ListenerError> {
        (self.deploy)(item.clone(), cx.clone()).await
    }

    async fn on_undeploy(
        &self,
        item: &WorkItem,
        cx: &ExecutionContext,
    ) -> Result<(), ListenerError> {
        (self.undeploy)(item.clone(), cx.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn closures_receive_item_and_context() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (d, u) = (seen.clone(), seen.clone());
        let l = ListenerFn::new(
            "rec",
            move |item: WorkItem, cx: ExecutionContext| {
                let d = d.clone();
                async move {
                    d.lock().unwrap().push(format!("+{}@{}", item.identity(), cx.label()));
                    Ok(())
                }
            },
            move |item: WorkItem, _cx: ExecutionContext| {
                let u = u.clone();
                async move {
                    u.lock().unwrap().push(format!("-{}", item.identity()));
                    Ok(())
                }
            },
        );

        let item = WorkItem::new("web").with_context(ExecutionContext::named("loader-1"));
        l.on_deploy(&item, item.context()).await.unwrap();
        l.on_undeploy(&item, item.context()).await.unwrap();

        assert_eq!(l.name(), "rec");
        assert_eq!(*seen.lock().unwrap(), vec!["+web@loader-1", "-web"]);
    }

    #[tokio::test]
    async fn deploy_only_ignores_undeploy() {
        let l = ListenerFn::deploy_only("fails", |_item, _cx| async {
            Err::<(), _>(ListenerError::failed("nope"))
        });
        let item = WorkItem::new("x");
        assert!(l.on_deploy(&item, item.context()).await.is_err());
        assert!(l.on_undeploy(&item, item.context()).await.is_ok());
    }
}
