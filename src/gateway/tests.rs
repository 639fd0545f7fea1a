//! Tests for the model gateway
//!
//! Backend behaviour is simulated with small `sh` scripts in a temp dir.

use super::process::render_arg;
use super::*;
use crate::core::Language;
use std::time::{Duration, Instant};

#[test]
fn test_default_config() {
    let config = GatewayConfig::default();
    assert_eq!(config.program, "ollama");
    assert_eq!(config.model, "deepseek-r1:8b");
    assert_eq!(config.timeout(), Duration::from_secs(120));
    assert_eq!(config.run_args, vec!["run", "{model}", "{prompt}"]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_requires_prompt_placeholder() {
    let mut config = GatewayConfig::default();
    config.run_args = vec!["run".to_string(), "{model}".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_install_command() {
    let gateway = ModelGateway::new(GatewayConfig::default());
    assert_eq!(gateway.install_command(), "ollama pull deepseek-r1:8b");
}

#[test]
fn test_render_arg_single_pass() {
    let lookup = |name: &str| match name {
        "prompt" => Some("say {model}".to_string()),
        "model" => Some("llama".to_string()),
        _ => None,
    };

    assert_eq!(render_arg("{model}", lookup), "llama");
    assert_eq!(render_arg("--m={model}!", lookup), "--m=llama!");
    assert_eq!(render_arg("{prompt}", lookup), "say {model}");
    assert_eq!(render_arg("{unknown} {", lookup), "{unknown} {");
}

#[test]
fn test_render_arg_stray_open_brace() {
    let lookup = |name: &str| match name {
        "model" => Some("llama".to_string()),
        _ => None,
    };

    assert_eq!(render_arg("a{b{model}", lookup), "a{bllama");
    assert_eq!(render_arg("{{model}}", lookup), "{llama}");
    assert_eq!(render_arg("{x{y{model}z", lookup), "{x{yllamaz");
}

#[test]
fn test_compose_with_system_prompt() {
    let invocation = ModelInvocation::new("Frage?", Language::De, Duration::from_secs(1))
        .with_system_prompt("Du bist Analyst.");

    assert_eq!(
        invocation.compose(),
        "Du bist Analyst.\n\nHuman: Frage?\n\nBitte antworte auf Deutsch."
    );
}

#[test]
fn test_compose_without_system_prompt() {
    let invocation = ModelInvocation::new("Question?", Language::En, Duration::from_secs(1));
    assert_eq!(
        invocation.compose(),
        "Question?\n\nPlease respond in English."
    );
}

#[test]
fn test_error_kinds() {
    let err = ModelError::Backend {
        exit_code: Some(1),
        stderr: "model crashed".to_string(),
    };
    assert_eq!(err.kind(), ModelErrorKind::BackendError);
    assert_eq!(err.detail(), "model crashed");

    let err = ModelError::NotAvailable {
        model: "m".to_string(),
        install_command: "ollama pull m".to_string(),
    };
    assert_eq!(err.kind(), ModelErrorKind::NotAvailable);
    assert_eq!(err.detail(), "ollama pull m");
}

#[tokio::test]
async fn test_missing_program_is_unavailable() {
    let config = GatewayConfig {
        program: "/nonexistent/polis-backend".to_string(),
        ..GatewayConfig::default()
    };
    let gateway = ModelGateway::new(config);

    assert!(!gateway.check_availability().await);
}

#[tokio::test]
async fn test_missing_program_ensure_available_is_typed() {
    let config = GatewayConfig {
        program: "/nonexistent/polis-backend".to_string(),
        ..GatewayConfig::default()
    };
    let model: &dyn LanguageModel = &ModelGateway::new(config);

    let result = model.ensure_available().await;
    assert!(matches!(
        result,
        Err(ModelError::NotAvailable { ref install_command, .. })
            if install_command == "/nonexistent/polis-backend pull deepseek-r1:8b"
    ));
}

#[tokio::test]
async fn test_missing_program_ask_reports_not_available() {
    let config = GatewayConfig {
        program: "/nonexistent/polis-backend".to_string(),
        ..GatewayConfig::default()
    };
    let gateway = ModelGateway::new(config);

    let result = gateway.ask("Hallo", None, Language::De).await;
    match result {
        Err(ModelError::NotAvailable {
            model,
            install_command,
        }) => {
            assert_eq!(model, "deepseek-r1:8b");
            assert_eq!(install_command, "/nonexistent/polis-backend pull deepseek-r1:8b");
        }
        other => panic!("expected NotAvailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_program_invoke_is_invocation_error() {
    let config = GatewayConfig {
        program: "/nonexistent/polis-backend".to_string(),
        ..GatewayConfig::default()
    };
    let gateway = ModelGateway::new(config);
    let invocation = ModelInvocation::new("Hallo", Language::De, Duration::from_secs(5));

    let err = gateway.invoke(&invocation).await.unwrap_err();
    assert_eq!(err.kind(), ModelErrorKind::InvocationError);
}

#[cfg(unix)]
mod script_backend {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Fake backend: `list` prints a listing, `run <model> <prompt>` runs `run_body`
    const LISTING: &str = "NAME              ID      SIZE\ndeepseek-r1:8b    abc123  4.9 GB\n";

    fn write_script(dir: &Path, list_body: &str, run_body: &str) -> String {
        let script = format!(
            "case \"$1\" in\n  list)\n{}\n    ;;\n  run)\n{}\n    ;;\nesac\n",
            list_body, run_body
        );
        let path = dir.join("backend.sh");
        std::fs::write(&path, script).unwrap();
        path.to_string_lossy().to_string()
    }

    /// Scripts run through `sh`, so they never need the exec bit
    fn gateway_for(script: &str, extra_run_args: &[&str]) -> ModelGateway {
        let mut run_args = vec![
            script.to_string(),
            "run".to_string(),
            "{model}".to_string(),
            "{prompt}".to_string(),
        ];
        run_args.extend(extra_run_args.iter().map(|s| s.to_string()));

        ModelGateway::new(GatewayConfig {
            program: "sh".to_string(),
            timeout_secs: 10,
            availability_timeout_ms: 2_000,
            list_args: vec![script.to_string(), "list".to_string()],
            run_args,
            ..GatewayConfig::default()
        })
    }

    fn listing_body() -> String {
        format!("    printf '%s' '{}'", LISTING)
    }

    #[tokio::test]
    async fn test_available_when_listed() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    echo ok");
        let gateway = gateway_for(&script, &[]);

        assert!(gateway.check_availability().await);
    }

    #[tokio::test]
    async fn test_unavailable_when_not_listed() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), "    echo 'NAME ID'\n    echo 'llama3:8b x'", "    echo ok");
        let gateway = gateway_for(&script, &[]);

        assert!(!gateway.check_availability().await);

        let result = gateway.ask("Hallo", None, Language::De).await;
        assert!(matches!(result, Err(ModelError::NotAvailable { .. })));
    }

    #[tokio::test]
    async fn test_unavailable_when_listing_fails() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), "    echo deepseek-r1:8b\n    exit 3", "    echo ok");
        let gateway = gateway_for(&script, &[]);

        assert!(!gateway.check_availability().await);
    }

    #[tokio::test]
    async fn test_availability_is_bounded() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), "    sleep 5", "    echo ok");
        let mut gateway = gateway_for(&script, &[]);
        gateway = ModelGateway::new(GatewayConfig {
            availability_timeout_ms: 200,
            ..gateway.config().clone()
        });

        let start = Instant::now();
        assert!(!gateway.check_availability().await);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_ask_returns_trimmed_output() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(
            temp_dir.path(),
            &listing_body(),
            "    echo\n    echo '  Die Antwort.  '\n    echo",
        );
        let gateway = gateway_for(&script, &[]);

        let answer = gateway.ask("Frage", None, Language::De).await.unwrap();
        assert_eq!(answer, "Die Antwort.");
    }

    #[tokio::test]
    async fn test_ask_passes_composed_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    printf '%s|%s' \"$2\" \"$3\"");
        let gateway = gateway_for(&script, &[]);

        let answer = gateway
            .ask("Was fordert die SPD?", Some("Du bist Politikanalyst."), Language::De)
            .await
            .unwrap();

        assert_eq!(
            answer,
            "deepseek-r1:8b|Du bist Politikanalyst.\n\nHuman: Was fordert die SPD?\n\nBitte antworte auf Deutsch."
        );
    }

    #[tokio::test]
    async fn test_invoke_backend_error_carries_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(
            temp_dir.path(),
            &listing_body(),
            "    echo 'model crashed' >&2\n    exit 1",
        );
        let gateway = gateway_for(&script, &[]);

        let result = gateway.ask("Frage", None, Language::En).await;
        match result {
            Err(ModelError::Backend { exit_code, stderr }) => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "model crashed");
            }
            other => panic!("expected Backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    sleep 5\n    echo late");
        let gateway = gateway_for(&script, &[]);
        let invocation =
            ModelInvocation::new("Frage", Language::De, Duration::from_millis(300));

        let start = Instant::now();
        let err = gateway.invoke(&invocation).await.unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(err.kind(), ModelErrorKind::Timeout);
        match err {
            ModelError::Timeout { elapsed: reported, limit } => {
                assert_eq!(limit, Duration::from_millis(300));
                assert!(reported >= limit);
            }
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_invoke_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    printf '\\377\\376'");
        let gateway = gateway_for(&script, &[]);
        let invocation = ModelInvocation::new("Frage", Language::De, Duration::from_secs(5));

        let err = gateway.invoke(&invocation).await.unwrap_err();
        assert_eq!(err.kind(), ModelErrorKind::InvocationError);
    }

    #[tokio::test]
    async fn test_invoke_forces_utf8_environment() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(
            temp_dir.path(),
            &listing_body(),
            "    printf '%s %s' \"$PYTHONIOENCODING\" \"$LC_ALL\"",
        );
        let gateway = gateway_for(&script, &[]);
        let invocation = ModelInvocation::new("Frage", Language::De, Duration::from_secs(5));

        let output = gateway.invoke(&invocation).await.unwrap();
        assert_eq!(output, "utf-8 C.UTF-8");
    }

    #[tokio::test]
    async fn test_sampling_placeholders_substituted() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    printf '%s %s' \"$4\" \"$5\"");
        let gateway = gateway_for(&script, &["--temperature={temperature}", "{max_tokens}"]);
        let invocation = ModelInvocation::new("Frage", Language::De, Duration::from_secs(5))
            .with_sampling(0.25, 512);

        let output = gateway.invoke(&invocation).await.unwrap();
        assert_eq!(output, "--temperature=0.25 512");
    }

    #[tokio::test]
    async fn test_prompt_is_not_reexpanded() {
        let temp_dir = TempDir::new().unwrap();
        let script = write_script(temp_dir.path(), &listing_body(), "    printf '%s' \"$3\"");
        let gateway = gateway_for(&script, &[]);
        let invocation = ModelInvocation::new("{model} {temperature}", Language::En, Duration::from_secs(5));

        let output = gateway.invoke(&invocation).await.unwrap();
        assert!(output.starts_with("{model} {temperature}"));
    }
}
