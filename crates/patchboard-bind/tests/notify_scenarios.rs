#![forbid(unsafe_code)]

//! End-to-end notification scenarios through the binding layer.
//!
//! Each test wires real bindings over a small project model and asserts
//! the fan-out behavior observable from the outside:
//!
//! 1. One bound reader, one successful mutation → exactly one invalidation.
//! 2. Two readers, one unbinds → only the remaining one fires.
//! 3. A global registration fires for a mutation on any subject; scoped
//!    observers on other subjects stay quiet.
//! 4. A failed mutation fires nothing.
//! 5. A reader torn down by another reader's callback mid-pass is skipped.
//! 6. A successful mutation notifies exactly its declared trigger list.

use patchboard_bind::{ReadBinding, WriteBinding, getter, setter};
use patchboard_core::{Hub, Key, Observer, Subject, SubjectId, SubjectTag};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Project {
    tag: SubjectTag,
    info: String,
    notes: String,
}

impl Project {
    fn shared(info: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            tag: SubjectTag::new(),
            info: info.into(),
            notes: String::new(),
        }))
    }
}

impl Subject for Project {
    fn subject_id(&self) -> SubjectId {
        self.tag.id()
    }
}

fn info_getter() -> patchboard_bind::Accessor<Project, String> {
    getter([Key::from_static("Project.info")], |p: &Project| {
        p.info.clone()
    })
}

fn set_info() -> patchboard_bind::Mutator<Project, String, (), String> {
    setter(
        [Key::from_static("Project.info")],
        |p: &mut Project, info: String| {
            if info.is_empty() {
                return Err("info cannot be empty".to_string());
            }
            p.info = info;
            Ok(())
        },
    )
}

fn counting_reader(
    hub: &Hub,
    project: &Rc<RefCell<Project>>,
) -> (ReadBinding<Project, String>, Rc<Cell<u32>>) {
    let hits = Rc::new(Cell::new(0u32));
    let hits_in = Rc::clone(&hits);
    let binding = ReadBinding::bind(hub, Rc::clone(project), info_getter(), move || {
        hits_in.set(hits_in.get() + 1);
    });
    (binding, hits)
}

#[test]
fn single_mutation_single_invalidation() {
    let hub = Hub::new();
    let project = Project::shared("v1");
    let (reader, hits) = counting_reader(&hub, &project);
    let writer = WriteBinding::bind(&hub, Rc::clone(&project), set_info());

    writer.mutate("v2".into()).unwrap();

    assert_eq!(hits.get(), 1);
    assert_eq!(reader.get(), "v2");
}

#[test]
fn unbound_reader_goes_quiet() {
    let hub = Hub::new();
    let project = Project::shared("v1");
    let (first, first_hits) = counting_reader(&hub, &project);
    let (_second, second_hits) = counting_reader(&hub, &project);
    let writer = WriteBinding::bind(&hub, Rc::clone(&project), set_info());

    first.unbind();
    writer.mutate("v2".into()).unwrap();

    assert_eq!(first_hits.get(), 0);
    assert_eq!(second_hits.get(), 1);
}

#[test]
fn global_trigger_crosses_subjects() {
    let hub = Hub::new();
    let mutated = Project::shared("b");
    let bystander = Project::shared("a");

    let global_hits = Rc::new(Cell::new(0u32));
    let global_in = Rc::clone(&global_hits);
    let _global = hub.subscribe(
        None,
        [Key::from_static("*Settings.theme")],
        Observer::new(move || global_in.set(global_in.get() + 1)),
    );

    let (_bystander_reader, bystander_hits) = counting_reader(&hub, &bystander);

    let set_theme = setter(
        [Key::from_static("*Settings.theme")],
        |p: &mut Project, theme: String| {
            p.notes = theme;
            Ok::<(), String>(())
        },
    );
    let writer = WriteBinding::bind(&hub, Rc::clone(&mutated), set_theme);
    writer.mutate("dark".into()).unwrap();

    assert_eq!(global_hits.get(), 1);
    assert_eq!(bystander_hits.get(), 0);
}

#[test]
fn failed_mutation_fires_nothing() {
    let hub = Hub::new();
    let project = Project::shared("v1");
    let (reader, hits) = counting_reader(&hub, &project);
    let writer = WriteBinding::bind(&hub, Rc::clone(&project), set_info());

    let err = writer.mutate(String::new()).unwrap_err();

    assert_eq!(err, "info cannot be empty");
    assert_eq!(hits.get(), 0);
    assert_eq!(reader.get(), "v1");
}

#[test]
fn reader_torn_down_mid_pass_is_skipped() {
    let hub = Hub::new();
    let project = Project::shared("v1");

    // Second reader parked where the first reader's callback can drop it.
    let parked: Rc<RefCell<Option<ReadBinding<Project, String>>>> =
        Rc::new(RefCell::new(None));
    let second_hits = Rc::new(Cell::new(0u32));

    let first_hits = Rc::new(Cell::new(0u32));
    let first_in = Rc::clone(&first_hits);
    let parked_in = Rc::clone(&parked);
    let first = ReadBinding::bind(&hub, Rc::clone(&project), info_getter(), move || {
        first_in.set(first_in.get() + 1);
        drop(parked_in.borrow_mut().take());
    });

    let second_in = Rc::clone(&second_hits);
    *parked.borrow_mut() = Some(ReadBinding::bind(
        &hub,
        Rc::clone(&project),
        info_getter(),
        move || second_in.set(second_in.get() + 1),
    ));

    let writer = WriteBinding::bind(&hub, Rc::clone(&project), set_info());
    writer.mutate("v2".into()).unwrap();

    assert_eq!(first_hits.get(), 1);
    assert_eq!(second_hits.get(), 0);
    drop(first);
    assert!(hub.is_empty());
}

#[test]
fn success_notifies_exactly_the_declared_triggers() {
    let hub = Hub::new();
    let project = Project::shared("v1");
    let subject = project.borrow().subject_id();

    let mut hits = Vec::new();
    let mut subs = Vec::new();
    for key in ["Project.info", "Project.notes", "Project.other"] {
        let count = Rc::new(Cell::new(0u32));
        let count_in = Rc::clone(&count);
        subs.push(hub.subscribe(
            Some(subject),
            [Key::from_static(key)],
            Observer::new(move || count_in.set(count_in.get() + 1)),
        ));
        hits.push(count);
    }

    let touch_both = setter(
        [
            Key::from_static("Project.info"),
            Key::from_static("Project.notes"),
        ],
        |p: &mut Project, info: String| {
            p.notes.push_str(&info);
            p.info = info;
            Ok::<(), String>(())
        },
    );
    let writer = WriteBinding::bind(&hub, Rc::clone(&project), touch_both);
    writer.mutate("v2".into()).unwrap();

    assert_eq!(hits[0].get(), 1, "declared trigger Project.info");
    assert_eq!(hits[1].get(), 1, "declared trigger Project.notes");
    assert_eq!(hits[2].get(), 0, "undeclared key must stay quiet");
}
