#[macro_use]
mod common;

#[cfg(test)]
mod r#return {
    tests! {
        after_else in return is OK
        "yes"
    }

    tests! {
        in_nested_block in return is OK
        "deep"
    }

    tests! {
        no_value in return is OK
        "nil"
    }

    tests! {
        after_while in return is OK
        "in loop"
    }

    tests! {
        at_top_level in return is ERR
        "[line 1] Error at 'return': Cannot return from top-level code."
    }

    tests! {
        in_block_at_top_level in return is ERR
        "[line 2] Error at 'return': Cannot return from top-level code."
    }
}
