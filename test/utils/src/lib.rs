/// A raw realtime store tree as returned by a one-shot read of
/// `/users/{uid}/question`. Contains two prompts: one fully answered with a
/// mix of answers and errors, and one still waiting on most models. The
/// `scratch` child under the second prompt is a malformed node that decoders
/// are expected to skip.
pub fn history_tree_fixture() -> &'static str {
    return r#"
{
  "qfirst": {
    "content": "What is the airspeed velocity of an unladen swallow?",
    "timestamp": 1700000001000,
    "deepseek": {
      "answer": "Roughly 11 meters per second for a European swallow.",
      "timestamp": 1700000002000
    },
    "grok": {
      "error": "timeout",
      "timestamp": 1700000003000
    }
  },
  "qsecond": {
    "content": "Write a haiku about compilers.",
    "timestamp": 1700000005000,
    "openai": {
      "answer": "Errors bloom like spring",
      "timestamp": 1700000006000
    },
    "scratch": {
      "note": "not a model response"
    }
  }
}
"#
    .trim();
}

/// A server-sent-event body as served by the realtime store's streaming read
/// path for a single model node: an initial null (nothing recorded yet), a
/// keep-alive, then the answer landing.
pub fn model_stream_fixture() -> &'static str {
    return r#"event: put
data: {"path": "/", "data": null}

event: keep-alive
data: null

event: put
data: {"path": "/", "data": {"answer": "Hi there", "timestamp": 1700000002000}}

"#;
}
