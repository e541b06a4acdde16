//! One-shot generation command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crafter_client::GenerationClient;
use crafter_core::{catalog, SessionOptions, SessionState, Severity};

use crate::config::ConfigFile;

/// Where the generated code went.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    /// Code to print on stdout
    Code(String),
    /// Exported file path
    File(PathBuf),
}

/// Run the generate command.
pub async fn run(
    config: &ConfigFile,
    framework: &str,
    out: Option<PathBuf>,
    description: &str,
) -> Result<()> {
    let client_config = config.generation.client_config()?;
    let client = GenerationClient::gemini(client_config).context("Failed to create generation client")?;

    match generate_with(&client, config.preview, framework, out.as_deref(), description).await? {
        Output::Code(code) => println!("{}", code),
        Output::File(path) => tracing::info!("Wrote {}", path.display()),
    }

    Ok(())
}

/// Drive one session through a generation with `client`.
pub async fn generate_with(
    client: &GenerationClient,
    options: SessionOptions,
    framework: &str,
    out: Option<&Path>,
    description: &str,
) -> Result<Output> {
    let entry = catalog::lookup(framework)?;

    let mut session = SessionState::new(options);
    session.set_prompt(description);
    session.set_framework(entry.framework);

    let request = session.begin_generation()?;
    let result = client.generate(&request).await;

    let notice = session.finish_generation(result);
    if notice.severity == Severity::Error {
        bail!("{}", notice.message);
    }
    tracing::info!("{}", notice.message);

    match out {
        Some(dir) => {
            let file = session.export()?;
            let path = file
                .write_into(dir)
                .with_context(|| format!("Failed to write into {}", dir.display()))?;
            Ok(Output::File(path))
        }
        None => Ok(Output::Code(session.code().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use crafter_client::{GenerationService, ResponseText, RetryPolicy, ServiceError};
    use tempfile::tempdir;

    struct CannedService(Result<&'static str, u16>);

    #[async_trait]
    impl GenerationService for CannedService {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate_content(
            &self,
            _model: &str,
            _prompt: &str,
        ) -> Result<ResponseText, ServiceError> {
            match self.0 {
                Ok(text) => Ok(text.into()),
                Err(status) => Err(ServiceError::new("failed").with_status(status)),
            }
        }
    }

    fn client(service: CannedService) -> GenerationClient {
        let retry = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
        };
        GenerationClient::new(Arc::new(service), "test-model", retry)
    }

    #[tokio::test]
    async fn prints_extracted_code() {
        let client = client(CannedService(Ok("```html\n<button>Go</button>\n```")));

        let output = generate_with(&client, SessionOptions::default(), "html-css", None, "a button")
            .await
            .unwrap();

        assert_eq!(output, Output::Code("<button>Go</button>".to_string()));
    }

    #[tokio::test]
    async fn exports_into_directory() {
        let dir = tempdir().unwrap();
        let client = client(CannedService(Ok("```ts\n@Component({})\nclass A {}\n```")));

        let output = generate_with(
            &client,
            SessionOptions::default(),
            "angular",
            Some(dir.path()),
            "a card",
        )
        .await
        .unwrap();

        let path = dir.path().join("CodeCrafter-Code.ts");
        assert_eq!(output, Output::File(path.clone()));
        assert_eq!(fs::read_to_string(path).unwrap(), "@Component({})\nclass A {}");
    }

    #[tokio::test]
    async fn unknown_framework_is_rejected() {
        let client = client(CannedService(Ok("unused")));

        let error = generate_with(&client, SessionOptions::default(), "svelte", None, "x")
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Unknown framework: svelte"));
    }

    #[tokio::test]
    async fn empty_description_is_rejected() {
        let client = client(CannedService(Ok("unused")));

        let error = generate_with(&client, SessionOptions::default(), "html-css", None, "  ")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Please describe your component first");
    }

    #[tokio::test]
    async fn service_failure_surfaces_user_message() {
        let client = client(CannedService(Err(400)));

        let error = generate_with(&client, SessionOptions::default(), "react-js", None, "a card")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Something went wrong while generating code");
    }
}
