use super::CallRecord;

/// Percorre a árvore de chamadas em pré-ordem, limitada em profundidade
///
/// A lista recebida está na profundidade 0; chamadas em profundidade maior
/// que `max_depth` não são visitadas.
pub fn walk_calls<'a, F>(calls: &'a [CallRecord], max_depth: usize, mut visitor: F)
where
    F: FnMut(usize, &'a CallRecord),
{
    walk_level(calls, 0, max_depth, &mut visitor);
}

fn walk_level<'a, F>(calls: &'a [CallRecord], depth: usize, max_depth: usize, visitor: &mut F)
where
    F: FnMut(usize, &'a CallRecord),
{
    if depth > max_depth {
        return;
    }

    for call in calls {
        visitor(depth, call);
        walk_level(&call.calls, depth + 1, max_depth, visitor);
    }
}

/// Achata a árvore em pré-ordem
pub fn collect_calls(calls: &[CallRecord], max_depth: usize) -> Vec<&CallRecord> {
    let mut result = Vec::new();
    walk_calls(calls, max_depth, |_, call| result.push(call));
    result
}

/// Verifica se alguma chamada da árvore satisfaz o predicado
pub fn any_call<F>(calls: &[CallRecord], max_depth: usize, mut predicate: F) -> bool
where
    F: FnMut(&CallRecord) -> bool,
{
    let mut found = false;
    walk_calls(calls, max_depth, |_, call| {
        if !found && predicate(call) {
            found = true;
        }
    });
    found
}
