// Display sink - where pipeline results land
use crate::domain::dashboard::{CardState, DashboardView, Notice};
use crate::domain::sensor::SensorKind;
use crate::domain::status::Status;
use crate::domain::telemetry::ChartData;

pub trait DisplaySink {
    /// Set the text content of a named element
    fn set_text(&mut self, element: &str, text: &str);

    /// Swap the state class on a sensor card
    fn set_card_state(&mut self, sensor: SensorKind, status: Status);

    /// Replace a chart series wholesale
    fn render(&mut self, series_id: &str, labels: &[String], values: &[Option<f64>]);

    /// Show a transient notice until `expires_at_ms`
    fn notify(&mut self, message: &str, expires_at_ms: i64);

    /// Drop notices that have expired, returns true if anything changed
    fn expire_notices(&mut self, now_ms: i64) -> bool;
}

impl DisplaySink for DashboardView {
    fn set_text(&mut self, element: &str, text: &str) {
        self.texts.insert(element.to_string(), text.to_string());
    }

    fn set_card_state(&mut self, sensor: SensorKind, status: Status) {
        self.cards.insert(sensor, CardState::new(status));
    }

    fn render(&mut self, series_id: &str, labels: &[String], values: &[Option<f64>]) {
        self.charts.insert(
            series_id.to_string(),
            ChartData::new(labels.to_vec(), values.to_vec()),
        );
    }

    fn notify(&mut self, message: &str, expires_at_ms: i64) {
        self.notice = Some(Notice {
            message: message.to_string(),
            expires_at_ms,
        });
    }

    fn expire_notices(&mut self, now_ms: i64) -> bool {
        match &self.notice {
            Some(notice) if notice.expires_at_ms <= now_ms => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_series() {
        let mut view = DashboardView::new();
        view.render("ph", &["a".to_string()], &[Some(7.0)]);
        view.render("ph", &["b".to_string(), "c".to_string()], &[None, Some(7.2)]);

        let chart = view.chart("ph").unwrap();
        assert_eq!(chart.labels, vec!["b", "c"]);
        assert_eq!(chart.values, vec![None, Some(7.2)]);
    }

    #[test]
    fn test_card_state_carries_class() {
        let mut view = DashboardView::new();
        view.set_card_state(SensorKind::Turbidity, Status::Critical);
        assert_eq!(view.card(SensorKind::Turbidity), Some(Status::Critical));
        assert_eq!(view.cards[&SensorKind::Turbidity].class, "status-critical");
    }

    #[test]
    fn test_notice_expires() {
        let mut view = DashboardView::new();
        view.notify("connection lost", 5_000);

        assert!(!view.expire_notices(4_999));
        assert!(view.notice.is_some());
        assert!(view.expire_notices(5_000));
        assert!(view.notice.is_none());
        assert!(!view.expire_notices(6_000));
    }
}
