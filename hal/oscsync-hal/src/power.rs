//! Interrupt enable and sleep control

/// Global interrupt and sleep mode control
pub trait SleepControl {
    /// Clear the global interrupt enable
    fn disable_interrupts(&mut self);

    /// Set or clear the sleep-enable intent
    ///
    /// Clearing it from an interrupt handler prevents a pending sleep
    /// instruction in the main loop from putting the device to sleep.
    fn set_sleep_enable(&mut self, enable: bool);

    /// Set the global interrupt enable and execute the sleep instruction
    ///
    /// The sleep instruction must be the instruction directly after the
    /// interrupt enable, so that no interrupt can run between the two.
    fn enable_interrupts_and_sleep(&mut self);
}
