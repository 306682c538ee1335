/// Process-wide interrupt mask.
///
/// Not reentrant: a disable is always followed by exactly one enable.
pub trait InterruptControl {
    fn disable(&self);

    fn enable(&self);
}

/// Interrupts stay masked for the lifetime of this guard and are re-enabled
/// when it is dropped, on every exit path.
pub struct InterruptFree<'a, IRQ: InterruptControl> {
    irq: &'a IRQ,
}

impl<'a, IRQ: InterruptControl> InterruptFree<'a, IRQ> {
    pub fn new(irq: &'a IRQ) -> Self {
        irq.disable();
        Self { irq }
    }
}

impl<'a, IRQ: InterruptControl> Drop for InterruptFree<'a, IRQ> {
    fn drop(&mut self) {
        self.irq.enable();
    }
}

/// PRIMASK based masking for Cortex-M cores
#[cfg(feature = "cortex-m")]
#[derive(Copy, Clone, Debug, Default)]
pub struct CortexM;

#[cfg(feature = "cortex-m")]
impl InterruptControl for CortexM {
    fn disable(&self) {
        cortex_m::interrupt::disable();
    }

    fn enable(&self) {
        unsafe { cortex_m::interrupt::enable() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeIrq;

    #[test]
    fn guard_pairs_disable_and_enable() {
        let irq = FakeIrq::default();
        {
            let _guard = InterruptFree::new(&irq);
            assert!(!irq.enabled());
        }
        assert!(irq.enabled());
        assert_eq!(irq.disable_count(), 1);
        assert_eq!(irq.enable_count(), 1);
    }

    #[test]
    fn guard_released_on_early_return() {
        fn fails(irq: &FakeIrq) -> Result<(), ()> {
            let _guard = InterruptFree::new(irq);
            let driver: Result<(), ()> = Err(());
            driver?;
            Ok(())
        }
        let irq = FakeIrq::default();
        assert!(fails(&irq).is_err());
        assert!(irq.enabled());
    }
}
