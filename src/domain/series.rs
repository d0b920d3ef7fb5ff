// Bounded chart history per sensor
use super::sensor::SensorKind;
use super::telemetry::ChartData;
use std::collections::{BTreeMap, VecDeque};

/// Label/value pairs capped at `cap`; the oldest entry goes first.
/// Labels and values always share the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSeries {
    cap: usize,
    labels: VecDeque<String>,
    values: VecDeque<Option<f64>>,
}

impl BoundedSeries {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            labels: VecDeque::with_capacity(cap),
            values: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, label: String, value: Option<f64>) {
        self.labels.push_back(label);
        self.values.push_back(value);
        while self.labels.len() > self.cap {
            self.labels.pop_front();
            self.values.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.iter().cloned().collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.values.iter().copied().collect()
    }

    pub fn to_chart(&self) -> ChartData {
        ChartData::new(self.labels(), self.values())
    }
}

#[derive(Debug, Clone)]
pub struct WindowedSeriesStore {
    cap: usize,
    series: BTreeMap<SensorKind, BoundedSeries>,
}

impl WindowedSeriesStore {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            series: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, sensor: SensorKind, label: String, value: Option<f64>) {
        self.series
            .entry(sensor)
            .or_insert_with(|| BoundedSeries::new(self.cap))
            .push(label, value);
    }

    /// Replace a sensor's series with the newest `cap` of `points`
    pub fn replace<I>(&mut self, sensor: SensorKind, points: I)
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        if let Some(series) = self.series.get_mut(&sensor) {
            series.clear();
        }
        for (label, value) in points {
            self.push(sensor, label, value);
        }
    }

    pub fn get(&self, sensor: SensorKind) -> Option<&BoundedSeries> {
        self.series.get(&sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest_beyond_cap() {
        let cap = 24;
        let mut series = BoundedSeries::new(cap);
        for i in 0..cap + 5 {
            series.push(format!("t{i}"), Some(i as f64));
        }

        assert_eq!(series.len(), cap);
        let labels = series.labels();
        assert_eq!(labels.first().map(String::as_str), Some("t5"));
        assert_eq!(labels.last().map(String::as_str), Some("t28"));

        let expected: Vec<Option<f64>> = (5..cap + 5).map(|i| Some(i as f64)).collect();
        assert_eq!(series.values(), expected);
    }

    #[test]
    fn test_missing_values_stay_gaps() {
        let mut series = BoundedSeries::new(3);
        series.push("a".into(), Some(1.0));
        series.push("b".into(), None);
        series.push("c".into(), Some(3.0));
        assert_eq!(series.values(), vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_store_keeps_sensors_apart() {
        let mut store = WindowedSeriesStore::new(2);
        store.push(SensorKind::Ph, "a".into(), Some(7.0));
        store.push(SensorKind::Ph, "b".into(), Some(7.1));
        store.push(SensorKind::Ph, "c".into(), Some(7.2));
        store.push(SensorKind::Turbidity, "a".into(), Some(3.0));

        let ph = store.get(SensorKind::Ph).unwrap();
        assert_eq!(ph.labels(), vec!["b", "c"]);
        assert_eq!(store.get(SensorKind::Turbidity).unwrap().len(), 1);
        assert!(store.get(SensorKind::Temperature).is_none());
    }

    #[test]
    fn test_replace_keeps_newest_window() {
        let mut store = WindowedSeriesStore::new(3);
        store.push(SensorKind::Temperature, "old".into(), Some(1.0));

        let points = (0..5).map(|i| (format!("p{i}"), Some(i as f64)));
        store.replace(SensorKind::Temperature, points);

        let chart = store.get(SensorKind::Temperature).unwrap().to_chart();
        assert_eq!(chart.labels, vec!["p2", "p3", "p4"]);
        assert_eq!(chart.values, vec![Some(2.0), Some(3.0), Some(4.0)]);
    }
}
