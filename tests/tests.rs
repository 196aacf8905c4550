// SPDX-License-Identifier: MPL-2.0

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::task::Poll;

use cudf_universe::{
    crawl, encode_document, encode_package, encode_version, render, CrawlError, Crawler, Map,
    OfflineResolver, PackageMetadata, Request, Resolution, Resolver, SemanticVersion,
    DEFAULT_MAX_CONCURRENT, LINE_ENDING,
};
use futures::executor::block_on;

/// Return `Pending` once, so that several calls are in flight together.
async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

/// Wraps an [OfflineResolver], counting calls per package and the number of
/// calls in flight.
#[derive(Default)]
struct InstrumentedResolver {
    registry: OfflineResolver,
    calls: RefCell<Map<String, usize>>,
    in_flight: Cell<usize>,
    max_in_flight: Cell<usize>,
}

impl InstrumentedResolver {
    fn new(registry: OfflineResolver) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    fn calls(&self, package: &str) -> usize {
        self.calls.borrow().get(package).copied().unwrap_or(0)
    }
}

impl Resolver for InstrumentedResolver {
    type Err = Infallible;

    async fn resolve(&self, request: &Request) -> Result<Resolution, Infallible> {
        *self
            .calls
            .borrow_mut()
            .entry(request.package_name.clone())
            .or_default() += 1;
        self.in_flight.set(self.in_flight.get() + 1);
        self.max_in_flight
            .set(self.max_in_flight.get().max(self.in_flight.get()));
        yield_now().await;
        self.in_flight.set(self.in_flight.get() - 1);
        self.registry.resolve(request).await
    }
}

#[derive(Debug, thiserror::Error)]
#[error("registry unreachable")]
struct Unreachable;

/// Fails for one package, behaves like the registry for the others.
struct FailingResolver {
    registry: OfflineResolver,
    broken: &'static str,
    requested: RefCell<Vec<String>>,
}

impl Resolver for FailingResolver {
    type Err = Unreachable;

    async fn resolve(&self, request: &Request) -> Result<Resolution, Unreachable> {
        self.requested.borrow_mut().push(request.package_name.clone());
        yield_now().await;
        if request.package_name == self.broken {
            return Err(Unreachable);
        }
        Ok(self.registry.resolve(request).await.unwrap_or(Resolution::NotFound))
    }
}

fn no_deps() -> Vec<(&'static str, &'static str)> {
    Vec::new()
}

#[test]
fn diamond_is_resolved_once() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("b", "^1.0.0"), ("c", "^1.0.0")]);
    registry.add_version("b", "1.0.0", [("d", ">=1")]);
    registry.add_version("b", "1.1.0", [("d", ">=2")]);
    registry.add_version("c", "1.0.0", [("d", "1.x")]);
    registry.add_version("d", "1.0.0", no_deps());
    registry.add_version("d", "2.0.0", no_deps());

    let resolver = InstrumentedResolver::new(registry);
    let universe = block_on(crawl(&resolver, ["a"])).unwrap();

    assert_eq!(universe.package_names(), ["a", "b", "c", "d"]);
    assert_eq!(universe.version_count(), 6);
    for package in ["a", "b", "c", "d"] {
        assert_eq!(resolver.calls(package), 1, "{package} resolved more than once");
    }
}

#[test]
fn cycles_terminate() {
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("b", "^1.0.0")]);
    registry.add_version("b", "1.0.0", [("a", "^1.0.0")]);

    let resolver = InstrumentedResolver::new(registry);
    let universe = block_on(crawl(&resolver, ["a"])).unwrap();

    assert_eq!(universe.package_names(), ["a", "b"]);
    assert_eq!(resolver.calls("a"), 1);
    assert_eq!(resolver.calls("b"), 1);
}

#[test]
fn depend_on_self() {
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("a", "*")]);

    let resolver = InstrumentedResolver::new(registry);
    let universe = block_on(crawl(&resolver, ["a"])).unwrap();
    assert_eq!(universe.len(), 1);
    assert_eq!(resolver.calls("a"), 1);
}

#[test]
fn missing_packages_contribute_no_versions() {
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("ghost", "^1.0.0")]);

    let universe = block_on(crawl(&registry, ["a"])).unwrap();
    assert_eq!(universe.get("ghost").map(|versions| versions.len()), Some(0));

    let doc = encode_document(&universe, &[] as &[&str]);
    assert_eq!(doc.universe.len(), 1);
}

#[test]
fn in_flight_calls_are_bounded() {
    let mut registry = OfflineResolver::new();
    let fan_out: Vec<_> = (0..40).map(|i| (format!("leaf{i}"), "*")).collect();
    registry.add_version("root", "1.0.0", fan_out);
    for i in 0..40 {
        registry.add_version(format!("leaf{i}"), "1.0.0", no_deps());
    }

    let resolver = InstrumentedResolver::new(registry);
    let universe = block_on(crawl(&resolver, ["root"])).unwrap();
    assert_eq!(universe.len(), 41);
    assert_eq!(resolver.max_in_flight.get(), DEFAULT_MAX_CONCURRENT);

    let resolver = InstrumentedResolver::new(resolver.registry);
    let universe =
        block_on(Crawler::new(&resolver).with_max_concurrent(3).crawl(["root"])).unwrap();
    assert_eq!(universe.len(), 41);
    assert!(resolver.max_in_flight.get() <= 3);
}

#[test]
fn resolver_failure_aborts_the_crawl() {
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("b", "^1.0.0"), ("c", "^1.0.0")]);
    registry.add_version("b", "1.0.0", no_deps());
    registry.add_version("c", "1.0.0", [("d", "^1.0.0")]);
    registry.add_version("d", "1.0.0", no_deps());

    let resolver = FailingResolver {
        registry,
        broken: "c",
        requested: RefCell::default(),
    };
    match block_on(crawl(&resolver, ["a"])) {
        Err(CrawlError::ResolverFailure { package, .. }) => assert_eq!(package, "c"),
        Ok(universe) => panic!("crawl succeeded with {} packages", universe.len()),
    }

    // `d` is only reachable through the failed `c`.
    let requested = resolver.requested.borrow();
    assert_eq!(requested[0], "a");
    assert!(requested.iter().any(|name| name == "c"));
    assert!(!requested.iter().any(|name| name == "d"));
}

#[test]
fn same_result_on_repeated_runs() {
    let mut registry = OfflineResolver::new();
    registry.add_version("a", "1.0.0", [("b", "^1"), ("c", "^1")]);
    registry.add_version("b", "1.0.0", [("c", "~1.0")]);
    registry.add_version("c", "1.0.0", no_deps());
    registry.add_version("c", "1.0.1", no_deps());

    let universe = block_on(crawl(&registry, ["a"])).unwrap();
    let first = render(&encode_document(&universe, &["a"])).unwrap();
    for concurrency in 1..5 {
        let crawler = Crawler::new(&registry).with_max_concurrent(concurrency);
        let universe = block_on(crawler.crawl(["a"])).unwrap();
        assert_eq!(render(&encode_document(&universe, &["a"])).unwrap(), first);
    }
}

#[test]
fn encode_app_with_alternation() {
    let meta = PackageMetadata::new("app", "1.0.0")
        .with_dependencies([("dep", "^2.0.0"), ("react", "^0.14.0 || ^15.0.0")]);
    let package = encode_package(&meta);

    assert_eq!(package.package, "app");
    assert_eq!(package.version, encode_version(&SemanticVersion::new(1, 0, 0)));
    assert!(!package.installed);

    let depends = package.depends.unwrap();
    let clauses = depends.clauses();
    assert_eq!(clauses.len(), 2 + 2 * 2);
    assert_eq!(clauses[0][0].to_string(), "dep >= 2000000");
    assert_eq!(clauses[1][0].to_string(), "dep < 3000000");
    assert!(clauses[2..]
        .iter()
        .all(|clause| clause.len() == 2 && clause.iter().all(|c| c.name == "react")));
}

#[test]
fn no_dependencies_no_clauses() {
    let package = encode_package(&PackageMetadata::new("leaf", "3.2.1"));
    assert!(package.depends.unwrap().is_empty());
    assert_eq!(package.version, 3_002_001);
}

#[test]
fn crawl_encode_render() {
    let mut registry = OfflineResolver::new();
    registry.add_version("app", "1.0.0", [("dep", "^2.0.0"), ("tool", "git+ssh://host/tool")]);
    registry.add_version("dep", "2.0.0", no_deps());
    registry.add_version("dep", "3.0.0", no_deps());

    let universe = block_on(crawl(&registry, ["app"])).unwrap();
    assert!(!universe.contains("tool"));
    let text = render(&encode_document(&universe, &["app"])).unwrap();
    assert_eq!(
        text,
        [
            "package: app",
            "version: 1000000",
            "installed: false",
            "depends: dep >= 2000000, dep < 3000000",
            "",
            "package: dep",
            "version: 2000000",
            "installed: false",
            "",
            "package: dep",
            "version: 3000000",
            "installed: false",
            "",
            "request:",
            "install: app >= 0",
        ]
        .join(LINE_ENDING)
    );
}
