/// A command asks the message bus to run a use case against one aggregate.
///
/// Commands represent **intent** and are transient: they are dispatched, never
/// stored. Contrast with events, which record what already happened.
///
/// ## Aggregate Targeting
///
/// Every command names the SKU of the product aggregate it targets. The bus
/// uses it to load exactly one aggregate per command.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_sku(&self) -> &str;
}
