//! Synchronous one-to-many notification primitive.
//!
//! Handlers are invoked in registration order, on the caller's stack, with no
//! isolation between them. Everything here is single-threaded.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// A registered callback. Cloning a handler yields the same handler, which is
/// what [`Event::unbind`] matches against.
pub struct Handler<T>(Rc<dyn Fn(&T)>);

impl<T> Handler<T> {
    pub fn new(f: impl Fn(&T) + 'static) -> Handler<T> {
        Handler(Rc::new(f))
    }

    fn call(&self, args: &T) {
        (self.0)(args)
    }

    fn address(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }

    fn same(&self, other: &Handler<T>) -> bool {
        self.address() == other.address()
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Handler(self.0.clone())
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&self.address())
            .finish()
    }
}

pub struct Event<T> {
    handlers: Rc<RefCell<Vec<Handler<T>>>>,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Event {
            handlers: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: 'static> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.len())
            .finish()
    }
}

impl<T: 'static> Event<T> {
    pub fn new() -> Event<T> {
        Event::default()
    }

    /// Registers `handler` and hands it back so it can be unbound later.
    /// Binding the same handler twice registers it twice.
    pub fn bind(&self, handler: Handler<T>) -> Handler<T> {
        self.handlers.borrow_mut().push(handler.clone());
        handler
    }

    /// Binds a closure and returns its handle.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Handler<T> {
        self.bind(Handler::new(f))
    }

    /// Registers a wrapper that removes itself after the first invocation.
    ///
    /// The wrapper, not `handler`, is what gets registered: passing `handler`
    /// to [`Event::unbind`] afterwards leaves the wrapper in place. Use the
    /// returned handle to cancel it.
    pub fn once(&self, handler: Handler<T>) -> Handler<T> {
        let handlers = Rc::downgrade(&self.handlers);
        let address: Rc<Cell<*const ()>> = Rc::new(Cell::new(std::ptr::null()));
        let fired = Cell::new(false);
        let own_address = address.clone();
        let wrapper = Handler::new(move |args: &T| {
            if fired.replace(true) {
                return;
            }
            if let Some(handlers) = handlers.upgrade() {
                let me = own_address.get();
                handlers.borrow_mut().retain(|h| h.address() != me);
            }
            handler.call(args);
        });
        address.set(wrapper.address());
        self.bind(wrapper)
    }

    /// Removes every registration of `handler`. No-op when it is not bound.
    pub fn unbind(&self, handler: &Handler<T>) {
        self.handlers.borrow_mut().retain(|h| !h.same(handler));
    }

    /// Invokes every handler registered at the time of the call, in
    /// registration order.
    pub fn trigger(&self, args: &T) {
        let handlers: Vec<_> = self.handlers.borrow().clone();
        for handler in handlers {
            handler.call(args);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counter() -> (Rc<Cell<usize>>, Handler<()>) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        (calls, Handler::new(move |_: &()| c.set(c.get() + 1)))
    }

    #[test]
    fn trigger_invokes_handlers_in_order_with_args() {
        let event = Event::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = seen.clone();
        event.subscribe(move |n| s1.borrow_mut().push(("first", *n)));
        let s2 = seen.clone();
        event.subscribe(move |n| s2.borrow_mut().push(("second", *n)));

        event.trigger(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn debug_shows_handler_count() {
        let event: Event<u32> = Event::new();
        event.subscribe(|_| {});
        event.subscribe(|_| {});
        assert_eq!(format!("{event:?}"), "Event { handlers: 2 }");
    }

    #[test]
    fn bind_returns_the_same_handler() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        let returned = event.bind(handler.clone());
        assert!(returned.same(&handler));

        event.unbind(&returned);
        event.trigger(&());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unbind_after_bind_invokes_nothing() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        event.bind(handler.clone());
        event.unbind(&handler);
        event.trigger(&());
        assert_eq!(calls.get(), 0);
        assert!(event.is_empty());
    }

    #[test]
    fn double_bind_fires_twice() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        event.bind(handler.clone());
        event.bind(handler);
        event.trigger(&());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unbind_removes_every_registration_of_a_handler() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        event.bind(handler.clone());
        event.bind(handler.clone());

        event.unbind(&handler);
        event.trigger(&());

        assert_eq!(calls.get(), 0);
        assert_eq!(event.len(), 0);
    }

    #[test]
    fn unbind_unknown_handler_is_noop() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        let (_, other) = counter();
        event.bind(handler);
        event.unbind(&other);
        event.trigger(&());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn once_fires_a_single_time() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        event.once(handler);

        event.trigger(&());
        event.trigger(&());

        assert_eq!(calls.get(), 1);
        assert!(event.is_empty());
    }

    #[test]
    fn unbinding_original_does_not_cancel_once() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        event.once(handler.clone());

        event.unbind(&handler);
        event.trigger(&());

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn once_handle_cancels_the_wrapper() {
        let event = Event::<()>::new();
        let (calls, handler) = counter();
        let wrapper = event.once(handler);

        event.unbind(&wrapper);
        event.trigger(&());

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn handler_bound_during_trigger_runs_next_time() {
        let event = Rc::new(Event::<()>::new());
        let (calls, handler) = counter();
        let inner = Rc::downgrade(&event);
        event.once(Handler::new(move |_| {
            if let Some(event) = inner.upgrade() {
                event.bind(handler.clone());
            }
        }));

        event.trigger(&());
        assert_eq!(calls.get(), 0);
        event.trigger(&());
        assert_eq!(calls.get(), 1);
    }
}
