#[macro_use]
mod common;

#[cfg(test)]
mod block {
    tests! {
        scope in block is OK
        "inner"
        "outer"
    }

    tests! {
        empty in block is OK
        "ok"
    }

    tests! {
        nested in block is OK
        "innermost"
        "middle"
        "outer"
    }

    tests! {
        unclosed in block is ERR
        "[line 3] Error at end: Expect '}' after block."
    }
}
