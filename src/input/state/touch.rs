use crate::input::events::{SensorSample, TouchBatch};

use super::RemoteState;

impl RemoteState {
    /// Processes one touch batch to completion.
    ///
    /// The grid sees every pointer in the batch; the pad sees the pointers on
    /// its side of the surface. While a sensor calibration is running, the
    /// next batch only ends it and is otherwise dropped.
    pub fn process_touch(&mut self, batch: &TouchBatch) {
        if self.sensor.is_calibrating() {
            self.sensor.finish_calibration();
            self.gesture.reset();
            return;
        }

        for transition in self.grid.process_batch(batch) {
            self.apply_transition(transition);
        }

        let mut pad_effects = Vec::new();
        self.gesture.process(batch, &mut pad_effects);
        self.extend(pad_effects);
    }

    /// Processes one screen-relative tilt sample.
    pub fn process_sensor(&mut self, sample: SensorSample) {
        let mut sensor_effects = Vec::new();
        self.sensor.process(sample, &mut sensor_effects);
        self.extend(sensor_effects);
    }
}
