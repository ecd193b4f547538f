/// Weighted mean over a stream of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverage {
    value: f64,
    sum: f64,
    count: usize,
    average: f64,
}

impl RunningAverage {
    pub const fn new() -> Self {
        Self {
            value: 0.0,
            sum: 0.0,
            count: 0,
            average: 0.0,
        }
    }

    pub fn update(&mut self, sample: f64, weight: usize) {
        self.value = sample;
        self.sum += sample * weight as f64;
        self.count += weight;
        if self.count > 0 {
            self.average = self.sum / self.count as f64;
        }
    }

    /// The most recent sample.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `sum / count`, or 0 before any weighted sample was seen.
    pub fn average(&self) -> f64 {
        self.average
    }
}

#[test]
fn weighted_average() {
    let mut m = RunningAverage::new();
    assert_eq!(m.average(), 0.0);

    m.update(100.0, 3);
    m.update(50.0, 1);
    assert_eq!(m.value(), 50.0);
    assert_eq!(m.sum(), 350.0);
    assert_eq!(m.count(), 4);
    assert_eq!(m.average(), 87.5);
}

#[test]
fn zero_weight_keeps_average() {
    let mut m = RunningAverage::new();
    m.update(10.0, 0);
    assert_eq!(m.value(), 10.0);
    assert_eq!(m.count(), 0);
    assert_eq!(m.average(), 0.0);

    m.update(4.0, 2);
    m.update(1.0, 0);
    assert_eq!(m.average(), 4.0);
}
