#![allow(dead_code)]

use anyhow::{anyhow, Result};
use rcomments::{parse_iso_date, Record, Transport};
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Build a record with fixed author/subreddit/url; only the fields tests vary are parameters.
pub fn rec(date: &str, score: i64, text: &str) -> Record {
    Record {
        date: parse_iso_date(date).unwrap(),
        author: "alice".to_string(),
        subreddit: "Coronavirus".to_string(),
        score,
        url: "n/a".to_string(),
        text: text.to_string(),
    }
}

/// Write raw CSV text to `dir/name` and return the path.
pub fn write_text(dir: &Path, name: &str, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let p = dir.join(name);
    fs::write(&p, contents).unwrap();
    p
}

/// The three-row corpus used by the end-to-end score query:
/// - 2020-01-01, score 5
/// - 2020-01-05, score 50
/// - 2020-01-10, score 1
/// Every text has at least ten words so the default word floor passes.
pub fn three_row_csv(dir: &Path) -> PathBuf {
    let body = "\
date,author,subreddit,score,url,text
2020-01-01,alice,Coronavirus,5,https://www.reddit.com/r/Coronavirus/comments/a/x/,\"first comment, with a comma, and enough words to pass the filter\"
2020-01-05,bob,Coronavirus,50,n/a,second comment has plenty of words in it to pass the default filter
2020-01-10,carol,Coronavirus,1,n/a,third comment is out of range but still long enough to qualify otherwise
";
    write_text(dir, "three.csv", body)
}

/// A search-API response body with one item per `(created_utc, score, permalink, body)`.
pub fn search_body(items: &[(i64, i64, Option<&str>, &str)]) -> String {
    let data: Vec<_> = items
        .iter()
        .map(|(ts, score, permalink, body)| {
            let mut v = json!({
                "created_utc": ts,
                "author": "bob",
                "subreddit": "Coronavirus",
                "score": score,
                "body": body,
            });
            if let Some(p) = permalink {
                v["permalink"] = json!(p);
            }
            v
        })
        .collect();
    json!({ "data": data }).to_string()
}

/// Transport that records every requested URL and answers from a queue of bodies.
/// When the queue runs dry it answers with an empty `data` array.
#[derive(Default)]
pub struct StubTransport {
    pub requested: RefCell<Vec<String>>,
    bodies: RefCell<VecDeque<Result<String, String>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn respond(self, body: impl Into<String>) -> Self {
        self.bodies.borrow_mut().push_back(Ok(body.into()));
        self
    }
    pub fn fail(self, msg: &str) -> Self {
        self.bodies.borrow_mut().push_back(Err(msg.to_string()));
        self
    }
    pub fn urls(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &str) -> Result<String> {
        self.requested.borrow_mut().push(url.to_string());
        match self.bodies.borrow_mut().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(msg)) => Err(anyhow!("{}", msg)),
            None => Ok(r#"{"data":[]}"#.to_string()),
        }
    }
}
