//! # RP2040 backend
//!
//! PWM slice + DMA channel + NVIC, driven through raw register blocks.
//!
//! The DMA channel copies one halfword from the playback buffer into the
//! slice's compare register each time the counter wraps, so the CPU is only
//! involved once per buffer, on `DMA_IRQ_1`. The fill request goes through
//! one of the spare IRQs (26..=31), pended in software.
//!
//! Wire the vectors to [`Audio::on_interrupt`](crate::Audio::on_interrupt):
//! `DMA_IRQ_1` to [`IrqSource::TransferComplete`], and the spare IRQ reported
//! by [`Rp2040Interrupts::fill_irq`] to [`IrqSource::FillPending`].

pub mod dma;
pub mod nvic;
pub mod pwm;

use bit_field::BitField;

use crate::config::OutputConfig;
use crate::driver::{InterruptController, IrqSource, PlaybackDriver, Priority};
use crate::error::InitError;
use crate::hw::dma::{DmaChannel, DmaIrq, DMA_IRQ_1, DREQ_PWM_WRAP0};
use crate::hw::nvic::Nvic;
use crate::hw::pwm::{pin_to_slice, PwmSlice};

/// PWM output fed by a DMA channel.
#[derive(Debug, Default)]
pub struct Rp2040Output {
    channel: Option<u8>,
}

impl Rp2040Output {
    pub const fn new() -> Self {
        Self { channel: None }
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }
}

impl PlaybackDriver for Rp2040Output {
    fn configure(&mut self, output: &OutputConfig) -> Result<(), InitError> {
        let channel = dma::claim_unused_channel().ok_or(InitError::NoTransferChannel)?;
        self.channel = Some(channel);

        pwm::set_pin_function_pwm(output.pin);
        let slice = pin_to_slice(output.pin);
        // fastest PWM: no clock division
        unsafe { PwmSlice::new(slice) }.configure(1, output.wrap());

        unsafe {
            let ch = DmaChannel::new(channel);
            ch.write_addr.write(PwmSlice::cc_addr(slice));
            ch.trans_count.write(output.buffer_len() as u32);
            // alias 1 CTRL does not trigger
            ch.al1_ctrl.write(dma::output_ctrl(channel, DREQ_PWM_WRAP0 + slice));

            DmaIrq::new().inte1.modify(|mut inte| *inte.set_bit(channel as usize, true));
        }

        Ok(())
    }

    fn start(&self, buffer: *const u16) {
        if let Some(channel) = self.channel {
            // the transfer count reloads from the value written in `configure`
            unsafe { DmaChannel::new(channel).al3_read_addr_trig.write(buffer as usize as u32) };
        }
    }

    fn owns_completion(&self) -> bool {
        self.channel
            .is_some_and(|channel| unsafe { DmaIrq::new() }.ints1.read().get_bit(channel as usize))
    }

    fn acknowledge(&self) {
        if let Some(channel) = self.channel {
            unsafe { DmaIrq::new().ints1.write(1 << channel) };
        }
    }
}

#[derive(Debug, Default)]
pub struct Rp2040Interrupts {
    fill_irq: Option<u8>,
}

impl Rp2040Interrupts {
    pub const fn new() -> Self {
        Self { fill_irq: None }
    }

    /// Spare IRQ carrying fill requests, once claimed.
    pub fn fill_irq(&self) -> Option<u8> {
        self.fill_irq
    }

    fn line(&self, source: IrqSource) -> Option<u8> {
        match source {
            IrqSource::TransferComplete => Some(DMA_IRQ_1),
            IrqSource::FillPending => self.fill_irq,
        }
    }
}

impl InterruptController for Rp2040Interrupts {
    fn claim(&mut self) -> Result<(), InitError> {
        self.fill_irq = Some(nvic::claim_user_irq().ok_or(InitError::NoDeferredIrq)?);
        Ok(())
    }

    fn enable(&mut self, source: IrqSource, priority: Priority) {
        if let Some(irq) = self.line(source) {
            let nvic = unsafe { Nvic::new() };
            nvic.set_priority(irq, priority);
            nvic.enable(irq);
        }
    }

    fn set_pending(&self, source: IrqSource) {
        if let Some(irq) = self.line(source) {
            unsafe { Nvic::new() }.set_pending(irq);
        }
    }

    fn clear_pending(&self, source: IrqSource) {
        if let Some(irq) = self.line(source) {
            unsafe { Nvic::new() }.clear_pending(irq);
        }
    }
}
