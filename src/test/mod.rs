//! Test infrastructure: isolated databases and a wired service context.


pub(crate) use context::TestContext;
