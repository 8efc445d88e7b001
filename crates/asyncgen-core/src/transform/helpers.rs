//! Runtime helpers referenced by rewritten code.
//!
//! Each helper is a self-contained ES5 function declaration. They are
//! appended to the output at most once, in a fixed order.

use serde::Serialize;

/// Coroutine runner: drives a started generator, resolving every yielded
/// value before resuming, and settles with the generator's return value.
pub const ASYNC_HELPER: &str = concat!(
    "function __async(g){return new Promise(function(s,j){",
    "function c(a,x){try{var r=g[x?\"throw\":\"next\"](a)}catch(e){return j(e)}",
    "return r.done?s(r.value):Promise.resolve(r.value).then(c,d)}",
    "function d(e){return c(e,1)}c()})}",
);

/// Queued async-iterator driver.
///
/// `next`/`throw`/`return` requests are queued and served one at a time.
/// Yielded `{__await: v}` markers are resolved and fed back without
/// settling a request; any other yield settles the request at the head of
/// the queue.
pub const ASYNC_GEN_HELPER: &str = concat!(
    "function __asyncGen(g){var q=[],T=[\"next\",\"throw\",\"return\"],I={};",
    "for(var i=0;i<3;i++){I[T[i]]=a.bind(0,i)}",
    "var Y=typeof Symbol===\"function\"&&Symbol;",
    "I[Y&&Y.iterator||\"@@iterator\"]=I[Y&&Y.asyncIterator||\"@@asyncIterator\"]=function(){return this};",
    "function a(t,v){return new Promise(function(s,j){q.push([s,j,v,t]);q.length===1&&c(v,t)})}",
    "function c(v,t){try{var r=g[T[t]](v),w=r.value}catch(e){return n(e,1)}",
    "if(!r.done&&w&&typeof w===\"object\"&&\"__await\"in w){",
    "Promise.resolve(w.__await).then(function(x){c(x,0)},function(e){c(e,1)})}",
    "else{n(r,0)}}",
    "function n(r,k){q.shift()[k](r);q.length&&c(q[0][2],q[0][3])}",
    "return I}",
);

/// Iterator-protocol normalizer: the async iterator of `o`, falling back to
/// its sync iterator.
pub const ASYNC_ITERATOR_HELPER: &str = concat!(
    "function __asyncIterator(o){var Y=typeof Symbol===\"function\"&&Symbol,",
    "i=o[Y&&Y.asyncIterator||\"@@asyncIterator\"]||o[Y&&Y.iterator||\"@@iterator\"];",
    "if(!i)throw new TypeError(\"Object is not AsyncIterable.\");return i.call(o)}",
);

/// Which constructs a transform rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperUsage {
    pub async_fn: bool,
    pub async_generator: bool,
    pub for_await: bool,
}

impl HelperUsage {
    /// Usage that pulls in every helper.
    pub const ALL: Self = Self {
        async_fn: true,
        async_generator: true,
        for_await: true,
    };

    pub fn any(&self) -> bool {
        self.async_fn || self.async_generator || self.for_await
    }

    /// Combine usage of several transforms.
    pub fn merge(&mut self, other: Self) {
        self.async_fn |= other.async_fn;
        self.async_generator |= other.async_generator;
        self.for_await |= other.for_await;
    }
}

/// Source of the helpers `used` needs, each preceded by a newline.
///
/// The runner is included for async generators as well, since their
/// rewritten bodies can contain nested async arrows.
pub fn render(used: HelperUsage) -> String {
    let mut out = String::new();
    if used.async_fn || used.async_generator {
        out.push('\n');
        out.push_str(ASYNC_HELPER);
    }
    if used.async_generator {
        out.push('\n');
        out.push_str(ASYNC_GEN_HELPER);
    }
    if used.for_await {
        out.push('\n');
        out.push_str(ASYNC_ITERATOR_HELPER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nothing() {
        assert_eq!(render(HelperUsage::default()), "");
        assert!(!HelperUsage::default().any());
    }

    #[test]
    fn test_render_plain_async() {
        let out = render(HelperUsage {
            async_fn: true,
            ..HelperUsage::default()
        });
        assert_eq!(out, format!("\n{ASYNC_HELPER}"));
    }

    #[test]
    fn test_render_generator_and_for_await_order() {
        let out = render(HelperUsage {
            async_generator: true,
            for_await: true,
            ..HelperUsage::default()
        });
        assert_eq!(
            out,
            format!("\n{ASYNC_HELPER}\n{ASYNC_GEN_HELPER}\n{ASYNC_ITERATOR_HELPER}")
        );
        assert_eq!(render(HelperUsage::ALL), out);
    }

    #[test]
    fn test_helpers_are_single_declarations() {
        for (name, source) in [
            ("__async", ASYNC_HELPER),
            ("__asyncGen", ASYNC_GEN_HELPER),
            ("__asyncIterator", ASYNC_ITERATOR_HELPER),
        ] {
            assert!(source.starts_with(&format!("function {name}(")));
            assert!(source.ends_with('}'));
            assert!(!source.contains('\n'));
            let opens = source.matches('{').count();
            assert_eq!(opens, source.matches('}').count(), "{name}");
        }
    }

    #[test]
    fn test_merge_and_serialize() {
        let mut usage = HelperUsage::default();
        usage.merge(HelperUsage {
            for_await: true,
            ..HelperUsage::default()
        });
        assert!(usage.any());
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json["forAwait"], true);
        assert_eq!(json["asyncGenerator"], false);
    }
}
