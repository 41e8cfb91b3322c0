//! Plateau-driven learning-rate schedule.

/// Shrinks the learning rate when the epoch loss stops improving and signals
/// the end of training once the rate drops below its floor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlateauSchedule {
    rate: f64,
    floor: f64,
    shrink_factor: f64,
    patience: usize,
    best_loss: f64,
    stale_epochs: usize,
}

impl PlateauSchedule {
    pub(crate) const fn new(rate: f64, floor: f64, shrink_factor: f64, patience: usize) -> Self {
        Self {
            rate,
            floor,
            shrink_factor,
            patience,
            best_loss: f64::INFINITY,
            stale_epochs: 0,
        }
    }

    pub(crate) const fn rate(&self) -> f64 {
        self.rate
    }

    /// Records one epoch's loss. Returns `false` once the rate has fallen
    /// below the floor.
    pub(crate) fn observe(&mut self, loss: f64) -> bool {
        if loss < self.best_loss {
            self.best_loss = loss;
            self.stale_epochs = 0;
        } else {
            self.stale_epochs += 1;
            if self.stale_epochs >= self.patience {
                self.rate *= self.shrink_factor;
                self.stale_epochs = 0;
            }
        }
        self.rate >= self.floor
    }
}
