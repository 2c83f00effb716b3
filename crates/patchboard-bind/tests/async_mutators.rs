#![forbid(unsafe_code)]

//! Deterministic interleaving tests for asynchronous mutations.
//!
//! Futures are driven by hand with a no-op waker so every suspension point
//! is under test control. The [`Gate`] future stays pending until its flag
//! opens, which lets these tests resolve concurrent mutations in any order
//! and observe the documented last-to-resolve-wins outcome.

use futures::task::noop_waker;
use patchboard_bind::{AsyncMutator, AsyncWriteBinding, MutateFuture, ReadBinding, getter, setter_async};
use patchboard_core::{Hub, Key, Subject, SubjectId, SubjectTag};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

struct Doc {
    tag: SubjectTag,
    title: String,
}

impl Doc {
    fn shared(title: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            tag: SubjectTag::new(),
            title: title.into(),
        }))
    }
}

impl Subject for Doc {
    fn subject_id(&self) -> SubjectId {
        self.tag.id()
    }
}

/// Pending until its shared flag is set.
struct Gate {
    open: Rc<Cell<bool>>,
}

impl Future for Gate {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.open.get() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

fn poll_once<T, E>(fut: &mut MutateFuture<T, E>) -> Poll<Result<T, E>> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    fut.as_mut().poll(&mut cx)
}

/// Retitle mutator gated per call: args carry the new title and the gate
/// flag controlling when the write lands.
fn gated_retitle() -> AsyncMutator<Doc, (String, Rc<Cell<bool>>), (), String> {
    setter_async(
        [Key::from_static("Doc.title")],
        |doc: Rc<RefCell<Doc>>, (title, open): (String, Rc<Cell<bool>>)| async move {
            Gate { open }.await;
            if title.is_empty() {
                return Err("empty title".to_string());
            }
            doc.borrow_mut().title = title;
            Ok(())
        },
    )
}

fn counting_reader(
    hub: &Hub,
    doc: &Rc<RefCell<Doc>>,
) -> (ReadBinding<Doc, String>, Rc<Cell<u32>>) {
    let hits = Rc::new(Cell::new(0u32));
    let hits_in = Rc::clone(&hits);
    let accessor = getter([Key::from_static("Doc.title")], |d: &Doc| d.title.clone());
    let binding = ReadBinding::bind(hub, Rc::clone(doc), accessor, move || {
        hits_in.set(hits_in.get() + 1);
    });
    (binding, hits)
}

#[test]
fn notification_waits_for_resolution() {
    let hub = Hub::new();
    let doc = Doc::shared("old");
    let (reader, hits) = counting_reader(&hub, &doc);
    let writer = AsyncWriteBinding::bind(&hub, Rc::clone(&doc), gated_retitle());

    let open = Rc::new(Cell::new(false));
    let mut fut = writer.mutate(("new".into(), Rc::clone(&open)));

    assert!(poll_once(&mut fut).is_pending());
    assert_eq!(hits.get(), 0, "no notification before the mutation lands");

    open.set(true);
    assert!(matches!(poll_once(&mut fut), Poll::Ready(Ok(()))));
    assert_eq!(hits.get(), 1);
    assert_eq!(reader.get(), "new");
}

#[test]
fn last_to_resolve_wins() {
    let hub = Hub::new();
    let doc = Doc::shared("old");
    let (reader, hits) = counting_reader(&hub, &doc);
    let writer = AsyncWriteBinding::bind(&hub, Rc::clone(&doc), gated_retitle());

    let open_first = Rc::new(Cell::new(false));
    let open_second = Rc::new(Cell::new(false));
    let mut first = writer.mutate(("first".into(), Rc::clone(&open_first)));
    let mut second = writer.mutate(("second".into(), Rc::clone(&open_second)));

    assert!(poll_once(&mut first).is_pending());
    assert!(poll_once(&mut second).is_pending());

    // The later-invoked mutation resolves earlier...
    open_second.set(true);
    assert!(matches!(poll_once(&mut second), Poll::Ready(Ok(()))));
    assert_eq!(doc.borrow().title, "second");
    assert_eq!(hits.get(), 1);

    // ...and the earlier-invoked one resolves last, determining the final
    // state. Each resolution ran its own notification pass.
    open_first.set(true);
    assert!(matches!(poll_once(&mut first), Poll::Ready(Ok(()))));
    assert_eq!(doc.borrow().title, "first");
    assert_eq!(hits.get(), 2);
    assert_eq!(reader.get(), "first");
}

#[test]
fn late_resolution_still_notifies_surviving_observers() {
    let hub = Hub::new();
    let doc = Doc::shared("old");
    let (origin_reader, origin_hits) = counting_reader(&hub, &doc);
    let (survivor, survivor_hits) = counting_reader(&hub, &doc);
    let writer = AsyncWriteBinding::bind(&hub, Rc::clone(&doc), gated_retitle());

    let open = Rc::new(Cell::new(false));
    let mut fut = writer.mutate(("new".into(), Rc::clone(&open)));
    assert!(poll_once(&mut fut).is_pending());

    // The originating binding and its reader unbind mid-flight.
    drop(writer);
    origin_reader.unbind();

    open.set(true);
    assert!(matches!(poll_once(&mut fut), Poll::Ready(Ok(()))));

    assert_eq!(doc.borrow().title, "new", "the subject is still mutated");
    assert_eq!(origin_hits.get(), 0, "unbound observer hears nothing");
    assert_eq!(survivor_hits.get(), 1);
    assert_eq!(survivor.get(), "new");
}

#[test]
fn async_failure_is_silent() {
    let hub = Hub::new();
    let doc = Doc::shared("old");
    let (_reader, hits) = counting_reader(&hub, &doc);
    let writer = AsyncWriteBinding::bind(&hub, Rc::clone(&doc), gated_retitle());

    let open = Rc::new(Cell::new(false));
    let mut fut = writer.mutate((String::new(), Rc::clone(&open)));
    assert!(poll_once(&mut fut).is_pending());

    open.set(true);
    match poll_once(&mut fut) {
        Poll::Ready(Err(err)) => assert_eq!(err, "empty title"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(hits.get(), 0);
    assert_eq!(doc.borrow().title, "old");
}
