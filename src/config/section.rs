//! Configuration sections.

use std::any::Any;

/// An object that exposes its values as a section of named keys.
///
/// This is used to introspect values that are otherwise only reachable
/// through typed accessors, for example when dumping the current decoration
/// settings into a support report. It can be derived with
/// `#[derive(ConfigSection)]`, tagging each exposed field with `#[key]`.
///
/// # Retrieving Arbitrary Values
///
/// `get_key` returns a dynamically typed trait object (i.e. `&dyn Any`).
///
/// It is then up to the caller to see if this object is of the
/// needed type, by calling [`downcast_ref`][1] on it:
///
/// ```rust
/// use wmdecor::config::ConfigSection;
///
/// fn try_getting_key(section: &dyn ConfigSection) {
///     /* try to extract our item named "foo" from the section */
///     let Some(val) = section.get_key("foo") else {
///         println!("no foo... T_T");
///         return
///     };
///     /* we're expecting 'foo' to be of type bool */
///     if let Some(b) = val.downcast_ref::<bool>() {
///         println!("we got foo: {}", b);
///     } else {
///         println!("oh no, wrong type!");
///     }
/// }
/// ```
///
/// A provided method, `get_key_static`, does this call for you,
/// but the trade-off is that it cannot be called on a trait object.
///
/// [1]: https://doc.rust-lang.org/std/any/trait.Any.html#method.downcast_ref
pub trait ConfigSection {
    /// Retrieve arbitrary key value pairs from storage.
    ///
    /// Should return None if the key does not exist in storage.
    fn get_key(&self, key: &str) -> Option<&dyn Any>;

    /// The names of every key exposed by this section, in a stable order.
    fn keys(&self) -> &'static [&'static str];

    /// A monomorphizable, easier-to-use version of `get_key`.
    fn get_key_static<V: Any>(&self, key: &str) -> Option<&V>
    where
        Self: Sized,
    {
        self.get_key(key).and_then(|v| v.downcast_ref::<V>())
    }
}
