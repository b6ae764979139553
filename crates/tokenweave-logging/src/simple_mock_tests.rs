// ABOUTME: tracing-mock checks for the re-exported macros and the timing guard
// ABOUTME: Verifies events and spans can be captured and asserted

#[cfg(test)]
mod tests {
    use crate::{OperationTimer, info, warn};
    use std::time::Duration;
    use tracing_mock::{expect, subscriber};

    #[test]
    fn test_reexported_macros_emit_events() {
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("First message")))
            .event(expect::event().with_fields(expect::msg("Second message")))
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            info!("First message");
            warn!("Second message");
        });

        handle.assert_finished();
    }

    #[test]
    fn test_structured_fields() {
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event().with_fields(
                    expect::field("color")
                        .with_value(&"white")
                        .and(expect::field("ratio").with_value(&4.5))
                        .and(expect::msg("On-tone kept")),
                ),
            )
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            info!(color = "white", ratio = 4.5, "On-tone kept");
        });

        handle.assert_finished();
    }

    #[test]
    fn test_timer_warns_past_threshold() {
        let (subscriber, handle) = subscriber::mock()
            .new_span(expect::span().named("operation"))
            .event(
                expect::event()
                    .at_level(tracing::Level::WARN)
                    .with_fields(expect::msg("Slow operation detected").and(
                        expect::field("operation").with_value(&"cascade"),
                    )),
            )
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            let timer = OperationTimer::new("cascade").with_warn_threshold(Duration::ZERO);
            std::thread::sleep(Duration::from_millis(2));
            drop(timer);
        });

        handle.assert_finished();
    }
}
