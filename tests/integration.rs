// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Drives the default registry against an in-memory canvas and a scripted model.

use std::sync::Arc;

use serde_json::json;

use hopper::prelude::*;

struct Fixture {
    registry: Registry,
    ctx: ToolContext,
    journal: CanvasJournal,
    slider: Guid,
    circle: Guid,
    plane: Guid,
    script: Guid,
}

fn fixture(llm: Option<Arc<ScriptedClient>>) -> Fixture {
    let mut canvas = MemoryCanvas::new();
    let slider = canvas.add_component("Number Slider", Point::new(0.0, 0.0)).unwrap();
    let circle = canvas.add_component("Circle", Point::new(300.0, 0.0)).unwrap();
    let plane = canvas.add_component("XY Plane", Point::new(0.0, 200.0)).unwrap();
    let script = canvas.add_component("Python 3 Script", Point::new(600.0, 0.0)).unwrap();
    let journal = canvas.journal();

    let mut ctx = ToolContext::new(Config::default()).with_canvas(CanvasHandle::spawn(canvas).unwrap());
    if let Some(client) = llm {
        ctx = ctx.with_llm(
            client,
            Capabilities::from([Capability::JsonOutput, Capability::ToolCalling]),
        );
    }

    Fixture {
        registry: default_registry().unwrap(),
        ctx,
        journal,
        slider,
        circle,
        plane,
        script,
    }
}

impl Fixture {
    async fn invoke(&self, tool: &str, arguments: serde_json::Value) -> ToolResult {
        self.registry.invoke_named(tool, arguments, &self.ctx).await
    }

    async fn component(&self, guid: Guid) -> serde_json::Value {
        let result = self
            .invoke("gh_get", json!({ "guids": [guid.to_string()] }))
            .await;
        assert!(result.success);
        result.payload.unwrap()["ghjson"]["components"][0].clone()
    }
}

#[tokio::test]
async fn test_connect_slider_to_circle_radius() {
    let f = fixture(None);

    let result = f
        .invoke(
            "gh_connect",
            json!({
                "connections": [{
                    "sourceGuid": f.slider.to_string(),
                    "targetGuid": f.circle.to_string(),
                    "targetParam": "Radius"
                }]
            }),
        )
        .await;

    assert!(result.success, "{:?}", result.error_message);
    let payload = result.payload.unwrap();
    assert_eq!(payload["successCount"], 1);
    assert_eq!(payload["failCount"], 0);
    assert_eq!(payload["successful"][0]["targetParam"], "Radius");
    assert!(result.messages.is_empty());

    let read = f
        .invoke(
            "gh_get",
            json!({ "guids": [f.slider.to_string(), f.circle.to_string()] }),
        )
        .await;
    let connections = &read.payload.unwrap()["ghjson"]["connections"];
    assert_eq!(connections[0]["from"]["paramName"], "Number");
    assert_eq!(connections[0]["to"]["paramName"], "Radius");
    assert_eq!(f.journal.undo_labels(), vec!["Connect components"]);
}

#[tokio::test]
async fn test_connect_reports_missing_source() {
    let f = fixture(None);
    let missing = Guid::new();

    let result = f
        .invoke(
            "gh_connect",
            json!({
                "connections": [{
                    "sourceGuid": missing.to_string(),
                    "targetGuid": f.circle.to_string()
                }]
            }),
        )
        .await;

    assert!(result.success);
    let payload = result.payload.unwrap();
    assert_eq!(payload["successCount"], 0);
    assert_eq!(payload["failCount"], 1);
    assert_eq!(
        payload["failed"][0]["error"],
        format!("Source component not found: {}", missing)
    );
}

#[tokio::test]
async fn test_connect_type_mismatch_only_warns() {
    let f = fixture(None);

    // Plane output into the Radius (Number) input.
    let result = f
        .invoke(
            "gh_connect",
            json!({
                "connections": [{
                    "sourceGuid": f.plane.to_string(),
                    "targetGuid": f.circle.to_string(),
                    "targetParam": "R"
                }]
            }),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.payload.unwrap()["successCount"], 1);
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_batch_with_some_invalid_items() {
    let f = fixture(None);
    let stranger = Guid::new();

    let result = f
        .invoke(
            "gh_delete",
            json!({ "guids": [f.slider.to_string(), "not-a-guid", stranger.to_string()] }),
        )
        .await;

    assert!(result.success);
    let payload = result.payload.unwrap();
    assert_eq!(payload["successCount"], 1);
    assert_eq!(payload["failCount"], 2);
    assert_eq!(payload["failed"][0]["error"], "Invalid GUID: not-a-guid");
    assert_eq!(
        payload["failed"][1]["error"],
        format!("Component not found: {}", stranger)
    );
}

#[tokio::test]
async fn test_toggle_lock_is_idempotent() {
    let f = fixture(None);
    let args = json!({ "guids": [f.circle.to_string()], "locked": true });

    let first = f.invoke("gh_toggle_lock", args.clone()).await;
    let second = f.invoke("gh_toggle_lock", args).await;

    assert_eq!(first.payload, second.payload);
    assert_eq!(second.payload.unwrap()["successCount"], 1);
    assert_eq!(f.component(f.circle).await["locked"], true);
    assert_eq!(f.journal.undo_labels().len(), 2);
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let f = fixture(None);
    let document = json!({
        "components": [
            { "name": "Number Slider", "instanceGuid": "s" },
            { "name": "Circle", "instanceGuid": "c", "nickname": "Ring" }
        ],
        "connections": [
            { "from": { "instanceGuid": "s", "paramName": "N" },
              "to": { "instanceGuid": "c", "paramName": "Radius" } }
        ]
    });

    let put = f
        .invoke("gh_put", json!({ "ghjson": document, "pivot": { "x": 1000.0, "y": 0.0 } }))
        .await;
    assert!(put.success, "{:?}", put.error_message);
    let placed = put.payload.unwrap();
    assert_eq!(placed["connectionsCreated"], 1);
    let guids: Vec<String> = placed["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["instanceGuid"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(placed["components"][1]["sourceGuid"], "c");

    let get = f.invoke("gh_get", json!({ "guids": guids })).await;
    let doc = GhDocument::from_value(&get.payload.unwrap()["ghjson"]).unwrap();
    assert_eq!(doc.components.len(), 2);
    assert_eq!(doc.components[1].nickname.as_deref(), Some("Ring"));
    assert_eq!(doc.connections.len(), 1);
    // Auto-layout: the circle sits one column right of the slider.
    let slider_pivot = doc.components[0].pivot.unwrap();
    let circle_pivot = doc.components[1].pivot.unwrap();
    assert_eq!(slider_pivot, Point::new(1000.0, 0.0));
    assert_eq!(circle_pivot, Point::new(1250.0, 0.0));
}

#[tokio::test]
async fn test_put_rejects_invalid_document_without_mutating() {
    let f = fixture(None);

    let result = f
        .invoke(
            "gh_put",
            json!({ "ghjson": { "components": [{ "name": "Teleporter", "instanceGuid": "t" }] } }),
        )
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("unknown component 'Teleporter'"));
    assert!(f.journal.undo_labels().is_empty());
}

#[tokio::test]
async fn test_tidy_up_follows_dependencies() {
    let f = fixture(None);
    f.invoke(
        "gh_connect",
        json!({
            "connections": [
                { "sourceGuid": f.plane.to_string(), "targetGuid": f.circle.to_string() },
                { "sourceGuid": f.slider.to_string(), "targetGuid": f.circle.to_string(), "targetParam": "Radius" }
            ]
        }),
    )
    .await;

    let result = f
        .invoke(
            "gh_tidy_up",
            json!({
                "guids": [f.slider.to_string(), f.plane.to_string(), f.circle.to_string()],
                "startPoint": { "x": 0.0, "y": 0.0 }
            }),
        )
        .await;
    assert!(result.success);

    assert_eq!(f.component(f.slider).await["pivot"], json!({ "x": 0.0, "y": 0.0 }));
    assert_eq!(f.component(f.plane).await["pivot"], json!({ "x": 0.0, "y": 120.0 }));
    assert_eq!(f.component(f.circle).await["pivot"], json!({ "x": 250.0, "y": 0.0 }));
}

#[tokio::test]
async fn test_list_filter_returns_matching_indices() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text("[0]")]));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke(
            "list_filter",
            json!({ "list": ["apple", "banana", "cherry"], "criteria": "starts with a" }),
        )
        .await;

    assert!(result.success, "{:?}", result.error_message);
    let payload = result.payload.unwrap();
    assert_eq!(payload["indices"], json!([0]));
    assert_eq!(payload["items"], json!(["apple"]));
    assert_eq!(result.metrics.unwrap().calls, 1);
    assert!(result.messages.is_empty());
    assert_eq!(client.call_count().await, 1);
}

#[tokio::test]
async fn test_text_tool_requires_completion_capability() {
    let f = fixture(None);

    let result = f
        .invoke("text_generate", json!({ "prompt": "hello" }))
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("text_completion"));
}

#[tokio::test]
async fn test_list_generate_stops_at_ceiling() {
    let client = Arc::new(ScriptedClient::repeating(Response::from_text(
        "I would rather not.",
    )));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("list_generate", json!({ "prompt": "colors", "count": 3 }))
        .await;

    assert!(!result.success);
    assert!(result
        .error_message
        .unwrap()
        .starts_with("Exceeded retry budget after 10 iterations"));
    assert_eq!(client.call_count().await, 10);
}

#[tokio::test]
async fn test_list_generate_accumulates_across_turns() {
    let client = Arc::new(ScriptedClient::new(vec![
        Response::from_text("[\"red\", \"green\"]"),
        Response::from_text("nope"),
        Response::from_text("```json\n[\"green\", \"blue\", \"cyan\"]\n```"),
    ]));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("list_generate", json!({ "prompt": "colors", "count": 3 }))
        .await;

    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.payload.unwrap()["items"], json!(["red", "green", "blue"]));
    assert_eq!(result.metrics.unwrap().calls, 3);

    // Every turn resends the whole transcript.
    let requests = client.requests().await;
    assert_eq!(requests[2].messages.len(), 5);
}

#[tokio::test]
async fn test_list_generate_returns_partial_list_with_warning() {
    let client = Arc::new(ScriptedClient::repeating(Response::from_text("[\"only\"]")));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("list_generate", json!({ "prompt": "things", "count": 4 }))
        .await;

    assert!(result.success);
    assert_eq!(result.payload.unwrap()["items"], json!(["only"]));
    assert_eq!(result.messages[0].severity, Severity::Warning);
    assert_eq!(client.call_count().await, 10);
}

#[tokio::test]
async fn test_gh_generate_uses_tools_and_corrects_itself() {
    let valid = "```json\n{\"components\": [\
        {\"name\": \"Number Slider\", \"instanceGuid\": \"r\"},\
        {\"name\": \"Circle\", \"instanceGuid\": \"c\"}],\
        \"connections\": [{\"from\": {\"instanceGuid\": \"r\", \"paramName\": \"Number\"},\
        \"to\": {\"instanceGuid\": \"c\", \"paramName\": \"Radius\"}}]}\n```";
    let client = Arc::new(ScriptedClient::new(vec![
        Response::from_tool_call("call_1", "gh_list_components", json!({ "filter": "circle" })),
        Response::from_text("{\"components\": [{\"name\": \"Teleporter\", \"instanceGuid\": \"t\"}]}"),
        Response::from_text(valid),
    ]));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("gh_generate", json!({ "prompt": "a circle with a slider radius" }))
        .await;

    assert!(result.success, "{:?}", result.error_message);
    let payload = result.payload.unwrap();
    assert_eq!(payload["iterations"], 3);
    assert_eq!(payload["toolCalls"], 1);
    assert_eq!(payload["ghjson"]["components"].as_array().unwrap().len(), 2);
    assert_eq!(result.metrics.unwrap().calls, 3);

    let requests = client.requests().await;
    assert!(requests[0].tools.iter().any(|t| t.name == "gh_list_components"));
    match &requests[1].messages.last().unwrap().content[0] {
        ContentBlock::ToolResult { content, is_error, .. } => {
            assert!(!is_error);
            assert!(content.contains("Circle"));
        }
        other => panic!("expected a tool result, got {:?}", other),
    }
    let correction = requests[2].messages.last().unwrap();
    assert!(matches!(
        &correction.content[0],
        ContentBlock::Text { text } if text.contains("unknown component 'Teleporter'")
    ));
}

#[tokio::test]
async fn test_gh_generate_exhausts_budget() {
    let client = Arc::new(ScriptedClient::repeating(Response::from_text("no document")));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("gh_generate", json!({ "prompt": "anything", "maxIterations": 2 }))
        .await;

    assert!(!result.success);
    assert!(result
        .error_message
        .unwrap()
        .starts_with("Exceeded retry budget after 2 iterations"));
    assert_eq!(client.call_count().await, 2);
}

#[tokio::test]
async fn test_script_generate_then_put() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text(
        "{\"code\": \"a = x + 1\", \"inputs\": [{\"name\": \"x\"}], \
         \"outputs\": [{\"name\": \"a\"}], \"nickname\": \"Inc\"}",
    )]));
    let f = fixture(Some(client.clone()));

    let generated = f
        .invoke("script_generate", json!({ "instructions": "add one to x" }))
        .await;
    assert!(generated.success, "{:?}", generated.error_message);
    let ghjson = generated.payload.unwrap()["ghjson"].clone();
    assert_eq!(ghjson["components"][0]["name"], "Python 3 Script");

    let requests = client.requests().await;
    assert!(requests[0].json_schema.is_some());

    let put = f.invoke("gh_put", json!({ "ghjson": ghjson })).await;
    assert!(put.success, "{:?}", put.error_message);
    assert_eq!(put.payload.unwrap()["components"][0]["nickname"], "Inc");
}

#[tokio::test]
async fn test_script_edit_rewrites_code() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text(
        "Here you go:\n```python\na = x * y\n```",
    )]));
    let f = fixture(Some(client));

    let result = f
        .invoke(
            "script_edit",
            json!({ "guid": f.script.to_string(), "instructions": "multiply" }),
        )
        .await;

    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(f.component(f.script).await["script"]["code"], "a = x * y");
    assert_eq!(f.journal.undo_labels(), vec!["Edit script"]);
}

#[tokio::test]
async fn test_script_edit_rejects_non_script() {
    let client = Arc::new(ScriptedClient::new(vec![]));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke(
            "script_edit",
            json!({ "guid": f.slider.to_string(), "instructions": "anything" }),
        )
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("is not a script component"));
    assert_eq!(client.call_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_moves_are_serialized() {
    let f = Arc::new(fixture(None));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let f = f.clone();
        handles.push(tokio::spawn(async move {
            f.invoke(
                "gh_move",
                json!({
                    "targets": [{ "guid": f.slider.to_string(), "x": 1.0, "y": 0.0 }],
                    "relative": true
                }),
            )
            .await
            .success
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(f.component(f.slider).await["pivot"]["x"], 10.0);
    assert_eq!(f.journal.undo_labels().len(), 10);
    assert_eq!(f.journal.redraw_count(), 10);
}

#[tokio::test]
async fn test_delete_reports_each_guid() {
    let f = fixture(None);
    let missing = Guid::new();

    let result = f
        .invoke(
            "gh_delete",
            json!({ "guids": [f.plane.to_string(), missing.to_string()] }),
        )
        .await;

    assert!(result.success);
    let payload = result.payload.unwrap();
    assert_eq!(payload["successCount"], 1);
    assert_eq!(payload["failCount"], 1);
    assert_eq!(payload["successful"][0]["name"], "XY Plane");
    assert_eq!(
        payload["failed"][0]["error"],
        format!("Component not found: {}", missing)
    );
    assert_eq!(f.journal.undo_labels(), vec!["Delete components"]);

    let read = f
        .invoke("gh_get", json!({ "guids": [f.plane.to_string()] }))
        .await;
    assert_eq!(read.payload.unwrap()["notFound"], json!([f.plane.to_string()]));
}

#[tokio::test]
async fn test_toggle_preview_off() {
    let f = fixture(None);

    let result = f
        .invoke(
            "gh_toggle_preview",
            json!({ "guids": [f.circle.to_string()], "previewOn": false }),
        )
        .await;

    assert!(result.success);
    assert_eq!(f.component(f.circle).await["preview"], false);
}

#[tokio::test]
async fn test_list_components_by_filter() {
    let f = fixture(None);

    let result = f
        .invoke("gh_list_components", json!({ "filter": "circle" }))
        .await;

    assert!(result.success);
    let payload = result.payload.unwrap();
    let components = payload["components"].as_array().unwrap();
    assert_eq!(payload["count"], components.len());
    assert!(components.iter().any(|c| c["name"] == "Circle"));
    assert!(f.journal.undo_labels().is_empty());
}

#[tokio::test]
async fn test_text_evaluate_reads_boolean() {
    let client = Arc::new(ScriptedClient::new(vec![
        Response::from_text("True, it mentions a circle."),
        Response::from_text("I cannot say."),
    ]));
    let f = fixture(Some(client));
    let args = json!({ "text": "Draw a circle", "question": "Is a circle mentioned?" });

    let yes = f.invoke("text_evaluate", args.clone()).await;
    assert!(yes.success, "{:?}", yes.error_message);
    assert_eq!(yes.payload.unwrap()["result"], true);

    let unclear = f.invoke("text_evaluate", args).await;
    assert!(!unclear.success);
    assert!(unclear.error_message.unwrap().contains("neither true nor false"));
}

#[tokio::test]
async fn test_list_filter_reads_wrapped_indices() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text(
        "{\"indices\": [0], \"count\": 1}",
    )]));
    let f = fixture(Some(client));

    let result = f
        .invoke(
            "list_filter",
            json!({ "list": ["apple", "banana", "cherry"], "criteria": "starts with a" }),
        )
        .await;

    assert!(result.success, "{:?}", result.error_message);
    let payload = result.payload.unwrap();
    assert_eq!(payload["indices"], json!([0]));
    assert_eq!(payload["items"], json!(["apple"]));
}

#[tokio::test]
async fn test_list_filter_fails_on_prose_reply() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text(
        "Only apple starts with a.",
    )]));
    let f = fixture(Some(client));

    let result = f
        .invoke(
            "list_filter",
            json!({ "list": ["apple", "banana", "cherry"], "criteria": "starts with a" }),
        )
        .await;

    assert!(!result.success);
    assert!(result
        .error_message
        .unwrap()
        .starts_with("Upstream failure: reply contained no index list"));
}

#[tokio::test]
async fn test_list_filter_accepts_empty_answer() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text("[]")]));
    let f = fixture(Some(client));

    let result = f
        .invoke(
            "list_filter",
            json!({ "list": ["apple", "banana"], "criteria": "is a vegetable" }),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.payload.unwrap()["indices"], json!([]));
}

#[tokio::test]
async fn test_list_generate_keeps_items_when_completion_fails() {
    let client = Arc::new(ScriptedClient::new(vec![Response::from_text(
        "[\"red\", \"green\"]",
    )]));
    let f = fixture(Some(client.clone()));

    let result = f
        .invoke("list_generate", json!({ "prompt": "colors", "count": 3 }))
        .await;

    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.payload.unwrap()["items"], json!(["red", "green"]));
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].severity, Severity::Warning);
    assert!(result.messages[0].text.contains("before the completion failed"));
    assert_eq!(client.call_count().await, 2);
}

#[tokio::test]
async fn test_list_generate_fails_when_first_call_fails() {
    let client = Arc::new(ScriptedClient::new(Vec::new()));
    let f = fixture(Some(client));

    let result = f
        .invoke("list_generate", json!({ "prompt": "colors", "count": 3 }))
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().starts_with("Upstream failure"));
}

#[tokio::test]
async fn test_connect_with_malformed_source_guid() {
    let f = fixture(None);

    let result = f
        .invoke(
            "gh_connect",
            json!({
                "connections": [{ "sourceGuid": "A", "targetGuid": f.circle.to_string() }]
            }),
        )
        .await;

    assert!(result.success);
    let payload = result.payload.unwrap();
    assert_eq!(payload["failCount"], 1);
    assert_eq!(
        payload["failed"][0]["error"],
        "Source component not found: A (not a valid GUID)"
    );
}

#[tokio::test]
async fn test_put_with_empty_document_text() {
    let f = fixture(None);

    let result = f.invoke("gh_put", json!({ "ghjson": "  " })).await;

    assert!(!result.success);
    assert_eq!(result.error_message.unwrap(), "Missing argument: ghjson is empty");
    assert!(f.journal.undo_labels().is_empty());
}
