//! Shared handler fixtures for integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;
use waypoint::{
    Handler, HandlerRegistry, HttpError, Invocation, OperationSpec, Router, RuntimeConfig,
};

/// Plain content handler with a spread of descriptor shapes.
pub struct Pages;

const PAGES_OPS: &[OperationSpec] = &[
    OperationSpec::public("index", 0),
    OperationSpec::public("show", 1),
    OperationSpec::public("compare", 2),
    OperationSpec::private("draft", 0),
    OperationSpec::shared("stats", 0),
];

impl Handler for Pages {
    fn operations(&self) -> &'static [OperationSpec] {
        PAGES_OPS
    }

    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        operation: &str,
        params: &[String],
    ) -> anyhow::Result<()> {
        match operation {
            "index" => write!(ctx.out, "pages index")?,
            "show" => write!(ctx.out, "show:{}", params[0])?,
            "compare" => write!(
                ctx.out,
                "compare:{}+{} extras={}",
                params[0],
                params[1],
                params.len() - 2
            )?,
            other => anyhow::bail!("unexpected operation `{other}`"),
        }
        Ok(())
    }
}

/// Records hook ordering by bracketing its output.
pub struct Lifecycle;

const LIFECYCLE_OPS: &[OperationSpec] = &[
    OperationSpec::public("index", 0),
    OperationSpec::lifecycle("_before"),
    OperationSpec::lifecycle("_after"),
];

impl Handler for Lifecycle {
    fn operations(&self) -> &'static [OperationSpec] {
        LIFECYCLE_OPS
    }

    fn before(&mut self, ctx: &mut Invocation<'_>) -> anyhow::Result<()> {
        write!(ctx.out, "[")?;
        Ok(())
    }

    fn after(&mut self, ctx: &mut Invocation<'_>) -> anyhow::Result<()> {
        write!(ctx.out, "]")?;
        Ok(())
    }

    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        _operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        write!(ctx.out, "index")?;
        Ok(())
    }
}

/// Defines a remap fallback plus one private operation, so both the
/// not-found and not-public paths land in `remap`.
pub struct Catchall;

const CATCHALL_OPS: &[OperationSpec] = &[
    OperationSpec::public("index", 0),
    OperationSpec::private("draft", 0),
];

impl Handler for Catchall {
    fn operations(&self) -> &'static [OperationSpec] {
        CATCHALL_OPS
    }

    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        _operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        write!(ctx.out, "catchall index")?;
        Ok(())
    }

    fn has_remap(&self) -> bool {
        true
    }

    fn remap(
        &mut self,
        ctx: &mut Invocation<'_>,
        operation: &str,
        params: &[String],
    ) -> anyhow::Result<()> {
        write!(ctx.out, "remap:{}:{}", operation, params.join(","))?;
        Ok(())
    }
}

/// Fails inside the operation body after writing partial output.
pub struct Broken;

const BROKEN_OPS: &[OperationSpec] = &[OperationSpec::public("index", 0)];

impl Handler for Broken {
    fn operations(&self) -> &'static [OperationSpec] {
        BROKEN_OPS
    }

    fn invoke(
        &mut self,
        ctx: &mut Invocation<'_>,
        _operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        write!(ctx.out, "half a page")?;
        anyhow::bail!("database exploded")
    }
}

/// Raises a typed status through the runtime failure channel.
pub struct Teapot;

const TEAPOT_OPS: &[OperationSpec] = &[OperationSpec::public("index", 0)];

impl Handler for Teapot {
    fn operations(&self) -> &'static [OperationSpec] {
        TEAPOT_OPS
    }

    fn invoke(
        &mut self,
        _ctx: &mut Invocation<'_>,
        _operation: &str,
        _params: &[String],
    ) -> anyhow::Result<()> {
        Err(anyhow::Error::new(HttpError::new(418, "short and stout")))
    }
}

/// Registry covering the fixture handlers plus the degenerate entry kinds.
pub fn demo_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register("Pages", |_| Ok(Box::new(Pages) as Box<dyn Handler>));
    registry.register("Pages::Admin", |_| {
        Ok(Box::new(Catchall) as Box<dyn Handler>)
    });
    registry.register("Lifecycle", |_| {
        Ok(Box::new(Lifecycle) as Box<dyn Handler>)
    });
    registry.register("Catchall", |_| Ok(Box::new(Catchall) as Box<dyn Handler>));
    registry.register("Broken", |_| Ok(Box::new(Broken) as Box<dyn Handler>));
    registry.register("Teapot", |_| Ok(Box::new(Teapot) as Box<dyn Handler>));
    registry.register("Root", |_| Ok(Box::new(Pages) as Box<dyn Handler>));
    registry.register("Catalog", |_| Ok(Box::new(Catchall) as Box<dyn Handler>));
    registry.register("Blog::Root", |_| Ok(Box::new(Pages) as Box<dyn Handler>));
    registry.register("Blog::Posts", |_| Ok(Box::new(Pages) as Box<dyn Handler>));
    registry.declare_source("Drafts");
    registry.declare_foreign("Helpers");
    registry
}

/// Router with the `blog` module alias registered.
pub fn demo_router() -> Router {
    let mut router = Router::new();
    router.register_module("Blog", "blog");
    router
}

pub fn debug_config() -> RuntimeConfig {
    RuntimeConfig::new(true)
}

pub fn production_config() -> RuntimeConfig {
    RuntimeConfig::new(false)
}
