//! End-to-end tests: reference binding, path resolution, and event ordering
//! against a live store.

use std::sync::{Arc, Mutex};

use canister::{
    action, create_store, getter, module, mutation, state, ActionRef, Bindings, BoundStore,
    ConfigError, GetterRef, Mapping, ModuleOptions, ModuleRef, MutationRef, StateRef, StoreOptions,
};

struct NsRefs {
    bar: StateRef<String>,
    get_bar: GetterRef<String>,
}

impl Bindings for NsRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new()
            .entry("bar", &self.bar)
            .entry("getBar", &self.get_bar)
    }
}

fn ns_module() -> ModuleRef<NsRefs> {
    module(ModuleOptions {
        namespaced: true,
        setup: || {
            let bar = state("bar".to_string());
            let get_bar = getter({
                let bar = bar.clone();
                move || bar.get()
            });
            NsRefs { bar, get_bar }
        },
    })
}

struct BaseRefs {
    local_bar: StateRef<String>,
    get_plain_bar: GetterRef<String>,
    get_chained_bar: GetterRef<String>,
    get_sibling_bar: GetterRef<String>,
}

impl Bindings for BaseRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new()
            .entry("localBar", &self.local_bar)
            .entry("getPlainBar", &self.get_plain_bar)
            .entry("getChainedBar", &self.get_chained_bar)
            .entry("getSiblingBar", &self.get_sibling_bar)
    }
}

fn base_module(sibling: ModuleRef<NsRefs>) -> ModuleRef<BaseRefs> {
    module(ModuleOptions {
        namespaced: false,
        setup: move || {
            let local_bar = state("bar".to_string());
            let get_plain_bar = getter({
                let local_bar = local_bar.clone();
                move || local_bar.get()
            });
            let get_chained_bar = getter({
                let get_plain_bar = get_plain_bar.clone();
                move || get_plain_bar.get()
            });
            let get_sibling_bar = getter(move || sibling.with(|refs| refs.get_bar.get()));
            BaseRefs {
                local_bar,
                get_plain_bar,
                get_chained_bar,
                get_sibling_bar,
            }
        },
    })
}

struct RootRefs {
    foo: StateRef<String>,
    get_foo: GetterRef<String>,
    get_foo_foo: GetterRef<String>,
    set_foo: MutationRef<String>,
    bah: StateRef<String>,
    set_bah: MutationRef<String>,
    set_foo_and_bah: MutationRef<(String, String)>,
    action_send: ActionRef<String, Vec<String>>,
    second_tier: ActionRef<String, Vec<String>>,
    ns_module: ModuleRef<NsRefs>,
    base_module: ModuleRef<BaseRefs>,
}

impl Bindings for RootRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new()
            .entry("foo", &self.foo)
            .entry("getFoo", &self.get_foo)
            .entry("getFooFoo", &self.get_foo_foo)
            .entry("SET_FOO", &self.set_foo)
            .entry("bah", &self.bah)
            .entry("SET_BAH", &self.set_bah)
            .entry("SET_FOO_AND_BAH", &self.set_foo_and_bah)
            .entry("actionSend", &self.action_send)
            .entry("secondTier", &self.second_tier)
            .entry("nsModule", &self.ns_module)
            .entry("baseModule", &self.base_module)
    }
}

fn root_setup() -> RootRefs {
    let foo = state("bar".to_string());
    let get_foo = getter({
        let foo = foo.clone();
        move || foo.get()
    });
    let get_foo_foo = getter({
        let get_foo = get_foo.clone();
        move || format!("{}{}", get_foo.get(), get_foo.get())
    });
    let set_foo = mutation({
        let foo = foo.clone();
        move |value: String| foo.set(value)
    });

    let bah = state("bah".to_string());
    let set_bah = mutation({
        let bah = bah.clone();
        move |value: String| bah.set(value)
    });
    let set_foo_and_bah = mutation({
        let set_foo = set_foo.clone();
        let set_bah = set_bah.clone();
        move |(foo_value, bah_value): (String, String)| {
            set_bah.call(bah_value);
            set_foo.call(foo_value);
        }
    });

    let action_send = action(|payload: String| async move { vec![payload.clone(), payload] });
    let second_tier = action({
        let action_send = action_send.clone();
        move |payload: String| {
            let action_send = action_send.clone();
            async move {
                let mut out = action_send.call(payload.clone()).await;
                out.extend(action_send.call(payload).await);
                out
            }
        }
    });

    let ns = ns_module();
    let base = base_module(ns.clone());

    RootRefs {
        foo,
        get_foo,
        get_foo_foo,
        set_foo,
        bah,
        set_bah,
        set_foo_and_bah,
        action_send,
        second_tier,
        ns_module: ns,
        base_module: base,
    }
}

fn bound() -> BoundStore<RootRefs> {
    create_store(StoreOptions { setup: root_setup }).expect("setup mapping assembles")
}

#[test]
fn reads_initial_state_through_the_store() {
    let app = bound();

    assert_eq!(app.store().state::<String>("foo"), Some("bar".to_string()));
}

#[test]
fn standalone_state_roundtrip() {
    let count = state(0);

    assert_eq!(count.get(), 0);
    count.set(1);
    assert_eq!(count.get(), 1);
}

#[test]
fn bound_state_redirects_to_store() {
    let app = bound();

    app.refs().foo.set("through-the-ref".to_string());
    assert_eq!(
        app.store().state::<String>("foo"),
        Some("through-the-ref".to_string())
    );

    // External direct mutation of the store is visible through the reference.
    assert!(app.store().set_state("foo", "behind-the-ref".to_string()));
    assert_eq!(app.refs().foo.get(), "behind-the-ref");
}

#[test]
fn bound_mutations_route_through_commit() {
    let app = bound();

    app.refs().set_foo.call("blahblahblah".to_string());
    assert_eq!(
        app.store().state::<String>("foo"),
        Some("blahblahblah".to_string())
    );
}

#[test]
fn namespaced_module_paths_resolve() {
    let app = bound();

    assert_eq!(
        app.store().state::<String>("nsModule/bar"),
        Some("bar".to_string())
    );
    assert_eq!(
        app.store().getter::<String>("nsModule/getBar"),
        Some("bar".to_string())
    );
    assert_eq!(app.refs().ns_module.path(), vec!["nsModule".to_string()]);
}

#[test]
fn un_namespaced_modules_are_transparent() {
    let app = bound();

    // The module contributes no path segment; its entries resolve as if
    // declared at the root.
    assert!(app.refs().base_module.path().is_empty());
    assert_eq!(
        app.store().state::<String>("localBar"),
        Some("bar".to_string())
    );
    assert_eq!(
        app.store().getter::<String>("getPlainBar"),
        Some("bar".to_string())
    );
    assert_eq!(
        app.store().getter::<String>("getChainedBar"),
        Some("bar".to_string())
    );
}

#[test]
fn getters_compose_through_the_store() {
    let app = bound();

    let get_foo = app.store().getter::<String>("getFoo").unwrap();
    assert_eq!(
        app.store().getter::<String>("getFooFoo"),
        Some(format!("{get_foo}{get_foo}"))
    );

    app.refs().set_foo.call("blah".to_string());
    let get_foo = app.store().getter::<String>("getFoo").unwrap();
    assert_eq!(get_foo, "blah");
    assert_eq!(
        app.store().getter::<String>("getFooFoo"),
        Some(format!("{get_foo}{get_foo}"))
    );
}

#[test]
fn nested_commits_emit_inner_events_first() {
    let app = bound();

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    app.store().subscribe({
        let events = Arc::clone(&events);
        move |event| events.lock().unwrap().push(event.path.clone())
    });

    app.refs()
        .set_foo_and_bah
        .call(("first".to_string(), "second".to_string()));

    assert_eq!(app.store().state::<String>("foo"), Some("first".to_string()));
    assert_eq!(app.store().state::<String>("bah"), Some("second".to_string()));

    // Events fire when commits resolve, so the nested commits come first.
    assert_eq!(
        *events.lock().unwrap(),
        vec!["SET_BAH", "SET_FOO", "SET_FOO_AND_BAH"]
    );
}

#[tokio::test]
async fn bound_actions_route_through_dispatch() {
    let app = bound();

    let out = app.refs().action_send.call("test".to_string()).await;
    assert_eq!(out, vec!["test", "test"]);
}

#[tokio::test]
async fn nested_dispatches_emit_outer_events_first() {
    let app = bound();

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    app.store().subscribe_action({
        let events = Arc::clone(&events);
        move |event| events.lock().unwrap().push(event.path.clone())
    });

    let out = app.refs().second_tier.call("test".to_string()).await;
    assert_eq!(out, vec!["test"; 4]);

    // Dispatch events fire at initiation, before the awaited bodies run.
    assert_eq!(
        *events.lock().unwrap(),
        vec!["secondTier", "actionSend", "actionSend"]
    );
}

#[test]
fn cross_module_getter_tracks_the_sibling() {
    let app = bound();

    assert_eq!(
        app.store().getter::<String>("getSiblingBar"),
        Some("bar".to_string())
    );

    app.refs()
        .ns_module
        .children()
        .bar
        .set("changed".to_string());
    assert_eq!(
        app.store().getter::<String>("getSiblingBar"),
        Some("changed".to_string())
    );
}

struct LeafRefs {
    x: StateRef<i32>,
}

impl Bindings for LeafRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new().entry("x", &self.x)
    }
}

struct MidRefs {
    inner: ModuleRef<LeafRefs>,
}

impl Bindings for MidRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new().entry("inner", &self.inner)
    }
}

struct OuterRefs {
    mid: ModuleRef<MidRefs>,
}

impl Bindings for OuterRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new().entry("mid", &self.mid)
    }
}

struct DeepRoot {
    outer: ModuleRef<OuterRefs>,
}

impl Bindings for DeepRoot {
    fn mapping(&self) -> Mapping {
        Mapping::new().entry("outer", &self.outer)
    }
}

fn deep_setup() -> DeepRoot {
    let inner = module(ModuleOptions {
        namespaced: true,
        setup: || LeafRefs { x: state(1) },
    });
    let mid = module(ModuleOptions {
        namespaced: false,
        setup: move || MidRefs { inner },
    });
    let outer = module(ModuleOptions {
        namespaced: true,
        setup: move || OuterRefs { mid },
    });
    DeepRoot { outer }
}

#[test]
fn deeply_nested_module_paths_resolve() {
    let app = create_store(StoreOptions { setup: deep_setup }).expect("setup mapping assembles");

    // The un-namespaced middle module contributes no segment.
    assert_eq!(app.store().state::<i32>("outer/inner/x"), Some(1));
    assert_eq!(app.store().state::<i32>("outer/mid/inner/x"), None);

    let outer = &app.refs().outer;
    assert_eq!(outer.path(), vec!["outer".to_string()]);
    assert_eq!(outer.children().mid.path(), vec!["outer".to_string()]);
    assert_eq!(
        outer.children().mid.children().inner.path(),
        vec!["outer".to_string(), "inner".to_string()]
    );

    let x = &outer.children().mid.children().inner.children().x;
    x.set(2);
    assert_eq!(app.store().state::<i32>("outer/inner/x"), Some(2));

    assert!(app.store().set_state("outer/inner/x", 3));
    assert_eq!(x.get(), 3);
}

#[test]
fn duplicate_names_fail_before_the_store_exists() {
    let result = create_store(StoreOptions {
        setup: || {
            let a = state(1);
            let b = state(2);
            Mapping::new().entry("dup", &a).entry("dup", &b)
        },
    });

    assert!(matches!(
        result,
        Err(ConfigError::DuplicateEntry(name)) if name == "dup"
    ));
}
