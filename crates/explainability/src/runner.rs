// explainability/src/runner.rs

use crate::{Explainer, ExplainerOutput};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trust_core::{Request, Response};

/// Run every explainer concurrently. A panicking or cancelled explainer
/// is logged and skipped; explanation is optional, so losing methods
/// never fails the verification.
pub async fn run_explainers(
    explainers: &[Arc<dyn Explainer>],
    request: &Arc<Request>,
    response: &Arc<Response>,
    cancel: &CancellationToken,
) -> Vec<ExplainerOutput> {
    let handles: Vec<(String, tokio::task::JoinHandle<Option<ExplainerOutput>>)> = explainers
        .iter()
        .map(|explainer| {
            let explainer = explainer.clone();
            let request = request.clone();
            let response = response.clone();
            let cancel = cancel.clone();
            let id = explainer.method_id().to_string();

            let handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    output = explainer.explain(&request, &response) => Some(output),
                }
            });
            (id, handle)
        })
        .collect();

    let results = join_all(handles.into_iter().map(|(id, handle)| async move {
        match handle.await {
            Ok(output) => output,
            Err(join_error) => {
                tracing::warn!(method = %id, error = %join_error, "explainer panicked; skipping");
                None
            }
        }
    }))
    .await;

    let mut outputs: Vec<ExplainerOutput> = results.into_iter().flatten().collect();
    outputs.sort_by(|a, b| a.method_id.cmp(&b.method_id));
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedExplainer {
        id: String,
    }

    #[async_trait]
    impl Explainer for FixedExplainer {
        fn method_id(&self) -> &str {
            &self.id
        }

        async fn explain(&self, _: &Request, _: &Response) -> ExplainerOutput {
            ExplainerOutput {
                method_id: self.id.clone(),
                features: vec![("length".into(), 1.0)],
                confidence: 0.8,
                fidelity: None,
            }
        }
    }

    struct PanickingExplainer;

    #[async_trait]
    impl Explainer for PanickingExplainer {
        fn method_id(&self) -> &str {
            "broken"
        }

        async fn explain(&self, _: &Request, _: &Response) -> ExplainerOutput {
            panic!("explainer bug")
        }
    }

    fn inputs() -> (Arc<Request>, Arc<Response>) {
        (
            Arc::new(Request::new("m", b"p".to_vec(), 1_700_000_000)),
            Arc::new(Response::new("text")),
        )
    }

    #[tokio::test]
    async fn test_outputs_sorted_by_method() {
        let explainers: Vec<Arc<dyn Explainer>> = vec![
            Arc::new(FixedExplainer { id: "lime".into() }),
            Arc::new(FixedExplainer { id: "gradient".into() }),
        ];
        let (request, response) = inputs();
        let outputs =
            run_explainers(&explainers, &request, &response, &CancellationToken::new()).await;

        let ids: Vec<&str> = outputs.iter().map(|o| o.method_id.as_str()).collect();
        assert_eq!(ids, vec!["gradient", "lime"]);
    }

    #[tokio::test]
    async fn test_panicking_explainer_skipped() {
        let explainers: Vec<Arc<dyn Explainer>> = vec![
            Arc::new(PanickingExplainer),
            Arc::new(FixedExplainer { id: "shap".into() }),
        ];
        let (request, response) = inputs();
        let outputs =
            run_explainers(&explainers, &request, &response, &CancellationToken::new()).await;

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].method_id, "shap");
    }

    #[tokio::test]
    async fn test_cancelled_yields_nothing() {
        let explainers: Vec<Arc<dyn Explainer>> =
            vec![Arc::new(FixedExplainer { id: "shap".into() })];
        let (request, response) = inputs();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outputs = run_explainers(&explainers, &request, &response, &cancel).await;
        assert!(outputs.is_empty());
    }
}
