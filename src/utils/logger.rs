use tracing::Subscriber;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Default directive when `RUST_LOG` is unset. Verbose runs log the engine's
/// per-category selection decisions.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "pc_build_assistant=debug,warm_cache=debug,info"
    } else {
        "pc_build_assistant=info,warm_cache=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// One JSON object per event; the enclosing span list is kept, the
/// duplicate `span` object is not.
fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .json()
        .with_current_span(false)
}

/// Human-readable logs on stderr; stdout stays free for replies.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .init();
}

/// One JSON object per line on stderr.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(json_layer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directive = default_directive(verbose);
            assert!(directive.starts_with("pc_build_assistant="));
            assert!(EnvFilter::try_new(directive).is_ok());
        }
    }

    #[test]
    fn test_json_layer_writes_one_object_per_event() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry().with(json_layer(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("chat", session = "s1");
            let _guard = span.enter();
            tracing::info!(budget = 1200, "build ready");
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let line = output.lines().next().unwrap();
        let event: serde_json::Value = serde_json::from_str(line).unwrap();

        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "build ready");
        assert_eq!(event["fields"]["budget"], 1200);
        assert!(event.get("span").is_none());
        assert_eq!(event["spans"][0]["name"], "chat");
    }
}
