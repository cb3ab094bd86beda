use num_traits::{Num, NumCast};
use serde::{Deserialize, Serialize};

/// Title and label of a histogram axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

/// A one-dimensional histogram with fixed-width binning.
///
/// Bin `0` is the underflow and bin `nbins + 1` the overflow; bins `1..=nbins`
/// cover `[low, high)`. The bin content type `W` mirrors the storage of the
/// histogram, e.g. `f32` for a float histogram or `i32` for an integer one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram<W> {
    name: String,
    title: String,
    low: f64,
    high: f64,
    contents: Vec<W>,
    entries: u64,
    // Sums over in-range fills, used for the mean.
    sum_w: f64,
    sum_wx: f64,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

impl<W> Histogram<W>
where
    W: Num + NumCast + Copy,
{
    /// Creates an empty histogram with `nbins` equal bins over `[low, high)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::hist::Histogram;
    ///
    /// let mut hist = Histogram::<f32>::new("E", "Energy", 10, 0.0, 10.0);
    /// assert_eq!(hist.fill(2.5), 3);
    /// assert_eq!(hist.fill(-1.0), 0);
    /// assert_eq!(hist.fill(10.0), 11);
    /// assert_eq!(hist.entries(), 3);
    /// assert_eq!(hist.bin_content(3), 1.0);
    /// ```
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        nbins: usize,
        low: f64,
        high: f64,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            low,
            high,
            contents: vec![W::zero(); nbins + 2],
            entries: 0,
            sum_w: 0.0,
            sum_wx: 0.0,
            x_axis: Axis::default(),
            y_axis: Axis::default(),
        }
    }
    /// Sets both axis titles. Builder style, used while booking.
    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_axis.title = x.into();
        self.y_axis.title = y.into();
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    /// Number of regular bins (without underflow and overflow).
    pub fn nbins(&self) -> usize {
        self.contents.len() - 2
    }
    pub fn low(&self) -> f64 {
        self.low
    }
    pub fn high(&self) -> f64 {
        self.high
    }
    /// Returns the index of the bin that contains `x`.
    pub fn find_bin(&self, x: f64) -> usize {
        let nbins = self.nbins();
        if x.is_nan() || x < self.low {
            0
        } else if x >= self.high {
            nbins + 1
        } else {
            let width = (self.high - self.low) / nbins as f64;
            // Rounding may push values just below `high` onto the edge.
            (1 + ((x - self.low) / width) as usize).min(nbins)
        }
    }
    /// Increments the bin containing `x` by one and returns its index.
    pub fn fill(&mut self, x: f64) -> usize {
        let bin = self.find_bin(x);
        self.contents[bin] = self.contents[bin] + W::one();
        self.entries += 1;
        if bin != 0 && bin != self.nbins() + 1 {
            self.sum_w += 1.0;
            self.sum_wx += x;
        }

        bin
    }
    /// Content of bin `bin`. Out-of-range indices read as empty.
    pub fn bin_content(&self, bin: usize) -> W {
        self.contents.get(bin).copied().unwrap_or_else(W::zero)
    }
    pub fn underflow(&self) -> W {
        self.contents[0]
    }
    pub fn overflow(&self) -> W {
        self.contents[self.nbins() + 1]
    }
    /// Number of fills, including underflow and overflow.
    pub fn entries(&self) -> u64 {
        self.entries
    }
    /// Sum of the regular bin contents.
    pub fn integral(&self) -> f64 {
        let nbins = self.nbins();
        self.contents[1..=nbins]
            .iter()
            .map(|w| w.to_f64().unwrap_or(0.0))
            .sum()
    }
    /// Mean of the filled values that landed in the regular bins. Zero for
    /// an empty histogram.
    pub fn mean(&self) -> f64 {
        if self.sum_w == 0.0 {
            0.0
        } else {
            self.sum_wx / self.sum_w
        }
    }
    /// Clears all bins and statistics, keeping the binning and titles.
    pub fn reset(&mut self) {
        self.contents.iter_mut().for_each(|w| *w = W::zero());
        self.entries = 0;
        self.sum_w = 0.0;
        self.sum_wx = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_find_bin_edges() {
        let hist = Histogram::<f32>::new("h", "h", 5000, 0.0, 5000.0);
        assert_eq!(hist.find_bin(-0.5), 0);
        assert_eq!(hist.find_bin(0.0), 1);
        assert_eq!(hist.find_bin(0.999), 1);
        assert_eq!(hist.find_bin(1.0), 2);
        assert_eq!(hist.find_bin(4999.5), 5000);
        assert_eq!(hist.find_bin(5000.0), 5001);
        assert_eq!(hist.find_bin(f64::NAN), 0);
    }

    #[test]
    fn histogram_negative_range() {
        let hist = Histogram::<i32>::new("t", "t", 5000, -2500.0, 2500.0);
        assert_eq!(hist.find_bin(-2500.0), 1);
        assert_eq!(hist.find_bin(-11.0), 2490);
        assert_eq!(hist.find_bin(11.0), 2512);
        assert_eq!(hist.find_bin(2212.0), 4713);
    }

    #[test]
    fn histogram_fill_integer_contents() {
        let mut hist = Histogram::<i32>::new("t", "t", 10, 0.0, 10.0);
        hist.fill(1.0);
        hist.fill(1.5);
        hist.fill(20.0);
        assert_eq!(hist.bin_content(2), 2);
        assert_eq!(hist.overflow(), 1);
        assert_eq!(hist.underflow(), 0);
        assert_eq!(hist.entries(), 3);
        assert_eq!(hist.integral(), 2.0);
        assert_eq!(hist.bin_content(100), 0);
    }

    #[test]
    fn histogram_mean_ignores_overflow() {
        let mut hist = Histogram::<f32>::new("h", "h", 10, 0.0, 10.0);
        assert_eq!(hist.mean(), 0.0);
        hist.fill(2.0);
        hist.fill(4.0);
        hist.fill(100.0);
        assert_eq!(hist.mean(), 3.0);
    }

    #[test]
    fn histogram_reset() {
        let mut hist =
            Histogram::<f32>::new("h", "title", 10, 0.0, 10.0).with_axis_titles("title", "Events");
        hist.fill(2.0);
        hist.reset();
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.integral(), 0.0);
        assert_eq!(hist.nbins(), 10);
        assert_eq!(hist.y_axis.title, "Events");
    }
}
